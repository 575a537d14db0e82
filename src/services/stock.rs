use crate::{
    db::DbPool,
    domain::MarketplaceAvailability,
    entities::{stock, supplier},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

fn check_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 0 {
        return Err(ServiceError::ValidationError(format!(
            "stock quantity must not be negative, got {}",
            quantity
        )));
    }
    Ok(())
}

/// Supplier stock levels. The database holds at most one row per (product, supplier).
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Inserts a new stock row; a second row for the same pair is a conflict.
    #[instrument(skip(self))]
    pub async fn create_stock(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        quantity: i32,
    ) -> Result<stock::Model, ServiceError> {
        check_quantity(quantity)?;
        let model = stock::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            supplier_id: Set(supplier_id),
            quantity: Set(quantity),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "stock record"))?;
        info!(stock_id = %model.id, quantity, "stock record created");
        Ok(model)
    }

    /// Sets the quantity for the pair, creating the row when missing.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        product_id: Uuid,
        supplier_id: Uuid,
        quantity: i32,
    ) -> Result<stock::Model, ServiceError> {
        check_quantity(quantity)?;
        let txn = self.db_pool.begin().await?;
        let existing = stock::Entity::find()
            .filter(stock::Column::ProductId.eq(product_id))
            .filter(stock::Column::SupplierId.eq(supplier_id))
            .one(&txn)
            .await?;
        let model = match existing {
            Some(row) => {
                let mut active: stock::ActiveModel = row.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(Utc::now());
                active.update(&txn).await?
            }
            None => stock::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                supplier_id: Set(supplier_id),
                quantity: Set(quantity),
                updated_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(|e| ServiceError::from_write(e, "stock record"))?,
        };
        txn.commit().await?;
        info!(product_id = %product_id, supplier_id = %supplier_id, quantity, "stock quantity set");
        Ok(model)
    }

    /// Stock rows of a product with their suppliers, in supplier order.
    #[instrument(skip(self))]
    pub async fn stock_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<(stock::Model, supplier::Model)>, ServiceError> {
        let rows = stock::Entity::find()
            .filter(stock::Column::ProductId.eq(product_id))
            .find_also_related(supplier::Entity)
            .order_by_asc(supplier::Column::Position)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(row, supplier)| supplier.map(|s| (row, s)))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn total_quantity(&self, product_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self
            .stock_for_product(product_id)
            .await?
            .iter()
            .map(|(row, _)| i64::from(row.quantity))
            .sum())
    }

    /// What marketplace feeds report for the product, honoring each supplier's policy.
    #[instrument(skip(self))]
    pub async fn marketplace_availability(
        &self,
        product_id: Uuid,
    ) -> Result<MarketplaceAvailability, ServiceError> {
        let rows = self.stock_for_product(product_id).await?;
        Ok(MarketplaceAvailability::aggregate(
            rows.iter()
                .map(|(row, supplier)| (supplier.marketplace_stock_policy, row.quantity)),
        ))
    }
}
