use crate::{
    db::DbPool,
    domain::DisplayColor,
    entities::{courier, manager},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_color(color: &str) -> Result<(), ValidationError> {
    DisplayColor::parse(color)
        .map(|_| ())
        .map_err(|_| ValidationError::new("color"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewStaffMember {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom = "validate_color")]
    pub color: String,
}

/// Couriers and managers shown on the delivery calendar.
#[derive(Clone)]
pub struct StaffService {
    db_pool: Arc<DbPool>,
}

impl StaffService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn normalized_color(raw: &str) -> Result<String, ServiceError> {
        DisplayColor::parse(raw)
            .map(String::from)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_courier(&self, input: NewStaffMember) -> Result<courier::Model, ServiceError> {
        input.validate()?;
        let model = courier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            color: Set(Self::normalized_color(&input.color)?),
            is_active: Set(true),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "courier"))?;
        info!(courier_id = %model.id, "courier created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_couriers(&self, active_only: bool) -> Result<Vec<courier::Model>, ServiceError> {
        let mut query = courier::Entity::find().order_by_asc(courier::Column::Name);
        if active_only {
            query = query.filter(courier::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_courier_active(&self, id: Uuid, active: bool) -> Result<courier::Model, ServiceError> {
        let found = courier::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("courier", id))?;
        let mut model: courier::ActiveModel = found.into();
        model.is_active = Set(active);
        Ok(model.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_courier(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = courier::Entity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("courier", id));
        }
        info!(courier_id = %id, "courier deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_manager(&self, input: NewStaffMember) -> Result<manager::Model, ServiceError> {
        input.validate()?;
        let model = manager::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            color: Set(Self::normalized_color(&input.color)?),
            is_active: Set(true),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "manager"))?;
        info!(manager_id = %model.id, "manager created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_managers(&self, active_only: bool) -> Result<Vec<manager::Model>, ServiceError> {
        let mut query = manager::Entity::find().order_by_asc(manager::Column::Name);
        if active_only {
            query = query.filter(manager::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_manager_color(&self, id: Uuid, color: &str) -> Result<manager::Model, ServiceError> {
        let found = manager::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("manager", id))?;
        let mut model: manager::ActiveModel = found.into();
        model.color = Set(Self::normalized_color(color)?);
        Ok(model.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_manager(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = manager::Entity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("manager", id));
        }
        info!(manager_id = %id, "manager deleted");
        Ok(())
    }
}
