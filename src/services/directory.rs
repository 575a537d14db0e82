use crate::{
    db::DbPool,
    entities::{contractor, country, currency, site},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCountry {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(equal = 2))]
    pub iso_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCurrency {
    #[validate(length(equal = 3))]
    pub code: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSite {
    #[validate(length(min = 1, max = 255))]
    pub domain: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// A contractor record as delivered by the 1C exchange.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContractorRecord {
    #[validate(length(min = 1, max = 64))]
    pub code_1c: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 10, max = 12))]
    pub inn: Option<String>,
}

/// Reference data: countries, currencies, sites and 1C contractors.
#[derive(Clone)]
pub struct DirectoryService {
    db_pool: Arc<DbPool>,
}

impl DirectoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_country(&self, input: NewCountry) -> Result<country::Model, ServiceError> {
        input.validate()?;
        let model = country::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            iso_code: Set(input.iso_code.map(|c| c.to_ascii_uppercase())),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "country"))?;
        info!(country_id = %model.id, name = %model.name, "country created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_country(&self, id: Uuid) -> Result<country::Model, ServiceError> {
        country::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("country", id))
    }

    #[instrument(skip(self))]
    pub async fn list_countries(&self) -> Result<Vec<country::Model>, ServiceError> {
        Ok(country::Entity::find()
            .order_by_asc(country::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Refused while any product lists the country.
    #[instrument(skip(self))]
    pub async fn delete_country(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = country::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "country", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("country", id));
        }
        info!(country_id = %id, "country deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_currency(&self, input: NewCurrency) -> Result<currency::Model, ServiceError> {
        input.validate()?;
        let model = currency::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.to_ascii_uppercase()),
            name: Set(input.name),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "currency"))?;
        info!(currency_id = %model.id, code = %model.code, "currency created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn find_currency(&self, code: &str) -> Result<Option<currency::Model>, ServiceError> {
        Ok(currency::Entity::find()
            .filter(currency::Column::Code.eq(code.to_ascii_uppercase()))
            .one(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_currencies(&self) -> Result<Vec<currency::Model>, ServiceError> {
        Ok(currency::Entity::find()
            .order_by_asc(currency::Column::Code)
            .all(&*self.db_pool)
            .await?)
    }

    /// Refused while any product is priced in the currency.
    #[instrument(skip(self))]
    pub async fn delete_currency(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = currency::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "currency", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("currency", id));
        }
        info!(currency_id = %id, "currency deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_site(&self, input: NewSite) -> Result<site::Model, ServiceError> {
        input.validate()?;
        let model = site::ActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(input.domain.to_lowercase()),
            name: Set(input.name),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "site"))?;
        info!(site_id = %model.id, domain = %model.domain, "site created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_sites(&self) -> Result<Vec<site::Model>, ServiceError> {
        Ok(site::Entity::find()
            .order_by_asc(site::Column::Domain)
            .all(&*self.db_pool)
            .await?)
    }

    /// Deletes the site together with every order placed on it.
    #[instrument(skip(self))]
    pub async fn delete_site(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = site::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "site", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("site", id));
        }
        info!(site_id = %id, "site deleted with its orders");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_contractor(
        &self,
        input: ContractorRecord,
    ) -> Result<contractor::Model, ServiceError> {
        input.validate()?;
        let model = contractor::ActiveModel {
            id: Set(Uuid::new_v4()),
            code_1c: Set(input.code_1c),
            name: Set(input.name),
            inn: Set(input.inn),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "contractor"))?;
        info!(contractor_id = %model.id, code_1c = %model.code_1c, "contractor created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn find_contractor_by_code(
        &self,
        code_1c: &str,
    ) -> Result<Option<contractor::Model>, ServiceError> {
        debug!("looking up contractor by 1C code");
        Ok(contractor::Entity::find()
            .filter(contractor::Column::Code1c.eq(code_1c))
            .one(&*self.db_pool)
            .await?)
    }

    /// Creates or refreshes a contractor from the 1C exchange, matching on the 1C code.
    #[instrument(skip(self))]
    pub async fn upsert_contractor(
        &self,
        input: ContractorRecord,
    ) -> Result<contractor::Model, ServiceError> {
        input.validate()?;
        match self.find_contractor_by_code(&input.code_1c).await? {
            Some(existing) => {
                let mut active: contractor::ActiveModel = existing.into();
                active.name = Set(input.name);
                active.inn = Set(input.inn);
                let model = active
                    .update(&*self.db_pool)
                    .await
                    .map_err(|e| ServiceError::from_write(e, "contractor"))?;
                info!(contractor_id = %model.id, "contractor refreshed from 1C");
                Ok(model)
            }
            None => self.create_contractor(input).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_contractors(&self) -> Result<Vec<contractor::Model>, ServiceError> {
        Ok(contractor::Entity::find()
            .order_by_asc(contractor::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Orders that named the contractor as buyer or seller keep existing with the
    /// reference cleared.
    #[instrument(skip(self))]
    pub async fn delete_contractor(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = contractor::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "contractor", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("contractor", id));
        }
        info!(contractor_id = %id, "contractor deleted");
        Ok(())
    }
}
