use crate::{
    db::DbPool,
    domain::StockReportPolicy,
    entities::supplier,
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSupplier {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub show_in_order: bool,
    #[serde(default)]
    pub marketplace_stock_policy: StockReportPolicy,
}

/// Service for managing suppliers and own warehouses
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(&self, input: NewSupplier) -> Result<supplier::Model, ServiceError> {
        input.validate()?;
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            position: Set(input.position),
            show_in_order: Set(input.show_in_order),
            marketplace_stock_policy: Set(input.marketplace_stock_policy),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "supplier"))?;
        info!(supplier_id = %model.id, code = %model.code, "supplier created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("supplier", id))
    }

    /// Lists suppliers in admin order
    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .order_by_asc(supplier::Column::Position)
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Suppliers offered as shipment warehouses on the order form
    #[instrument(skip(self))]
    pub async fn list_for_order(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .filter(supplier::Column::ShowInOrder.eq(true))
            .order_by_asc(supplier::Column::Position)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn set_stock_policy(
        &self,
        id: Uuid,
        policy: StockReportPolicy,
    ) -> Result<supplier::Model, ServiceError> {
        let mut active: supplier::ActiveModel = self.get_supplier(id).await?.into();
        active.marketplace_stock_policy = Set(policy);
        let model = active.update(&*self.db_pool).await?;
        info!(supplier_id = %id, %policy, "supplier stock policy changed");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn set_position(&self, id: Uuid, position: i32) -> Result<supplier::Model, ServiceError> {
        let mut active: supplier::ActiveModel = self.get_supplier(id).await?.into();
        active.position = Set(position);
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Refused while products, stock rows or orders reference the supplier.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = supplier::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "supplier", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("supplier", id));
        }
        info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }
}
