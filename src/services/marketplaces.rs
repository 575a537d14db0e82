use crate::{
    db::DbPool,
    domain::{MarketplaceExport, MarketplaceExports},
    entities::{marketplace, product, product_marketplace},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// A product as offered on one marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedProduct {
    pub product: product::Model,
    pub price: Decimal,
}

/// Marketplace registry and per-product export settings.
#[derive(Clone)]
pub struct MarketplaceService {
    db_pool: Arc<DbPool>,
}

impl MarketplaceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_marketplaces(&self, active_only: bool) -> Result<Vec<marketplace::Model>, ServiceError> {
        let mut query = marketplace::Entity::find().order_by_asc(marketplace::Column::Code);
        if active_only {
            query = query.filter(marketplace::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    /// Registers another marketplace. Only a row is added; products opt in through
    /// [`MarketplaceService::set_export`].
    #[instrument(skip(self))]
    pub async fn add_marketplace(&self, code: &str, name: &str) -> Result<marketplace::Model, ServiceError> {
        let code = code.trim();
        let valid = !code.is_empty()
            && code.len() <= 32
            && code
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(ServiceError::ValidationError(format!(
                "marketplace code {:?} must be 1-32 characters of a-z, 0-9 or _",
                code
            )));
        }
        let model = marketplace::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            is_active: Set(true),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "marketplace"))?;
        info!(code = %model.code, "marketplace added");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn set_marketplace_active(&self, code: &str, is_active: bool) -> Result<(), ServiceError> {
        let found = marketplace::Entity::find_by_id(code.to_string())
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("marketplace {} not found", code)))?;
        let mut active: marketplace::ActiveModel = found.into();
        active.is_active = Set(is_active);
        active.update(&*self.db_pool).await?;
        Ok(())
    }

    /// Creates or replaces the product's export settings for one marketplace.
    #[instrument(skip(self))]
    pub async fn set_export(
        &self,
        product_id: Uuid,
        marketplace_code: &str,
        export: MarketplaceExport,
    ) -> Result<(), ServiceError> {
        if export.price.map_or(false, |p| p.is_sign_negative()) {
            return Err(ServiceError::ValidationError(
                "marketplace price must not be negative".into(),
            ));
        }
        product_marketplace::Entity::insert(product_marketplace::ActiveModel {
            product_id: Set(product_id),
            marketplace_code: Set(marketplace_code.to_string()),
            enabled: Set(export.enabled),
            price: Set(export.price),
        })
        .on_conflict(
            OnConflict::columns([
                product_marketplace::Column::ProductId,
                product_marketplace::Column::MarketplaceCode,
            ])
            .update_columns([
                product_marketplace::Column::Enabled,
                product_marketplace::Column::Price,
            ])
            .to_owned(),
        )
        .exec_without_returning(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "marketplace export"))?;
        info!(
            product_id = %product_id,
            marketplace = marketplace_code,
            enabled = export.enabled,
            "marketplace export set"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn exports(&self, product_id: Uuid) -> Result<MarketplaceExports, ServiceError> {
        Ok(product_marketplace::Entity::find()
            .filter(product_marketplace::Column::ProductId.eq(product_id))
            .all(&*self.db_pool)
            .await?
            .iter()
            .map(|row| (row.marketplace_code.clone(), MarketplaceExport::from(row)))
            .collect())
    }

    /// Active products enabled for the marketplace, with the price to publish.
    #[instrument(skip(self))]
    pub async fn products_exported_to(
        &self,
        marketplace_code: &str,
    ) -> Result<Vec<ExportedProduct>, ServiceError> {
        let rows = product_marketplace::Entity::find()
            .filter(product_marketplace::Column::MarketplaceCode.eq(marketplace_code))
            .filter(product_marketplace::Column::Enabled.eq(true))
            .find_also_related(product::Entity)
            .all(&*self.db_pool)
            .await?;

        let mut exported: Vec<ExportedProduct> = rows
            .into_iter()
            .filter_map(|(export, product)| {
                let product = product.filter(|p| p.is_active)?;
                let price = MarketplaceExport::from(&export).effective_price(product.price);
                Some(ExportedProduct { product, price })
            })
            .collect();
        exported.sort_by(|a, b| a.product.code.cmp(&b.product.code));
        Ok(exported)
    }
}
