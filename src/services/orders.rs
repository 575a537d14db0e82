use crate::{
    db::DbPool,
    domain::OrderStatus,
    entities::{order, order_item, product, shipping_box},
    errors::ServiceError,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Defaults to the product's current price.
    pub price: Option<Decimal>,
    pub box_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrder {
    pub site_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub shipment_warehouse_id: Option<Uuid>,
    #[serde(default)]
    pub status: OrderStatus,
    pub comment: Option<String>,
    #[validate]
    pub items: Vec<NewOrderItem>,
}

/// Delivery-service details; `None` clears a field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub dispatch_date: Option<NaiveDate>,
    pub handing_date: Option<NaiveDate>,
    pub delivery_order_id: Option<String>,
}

fn writable_status(status: OrderStatus) -> Result<i32, ServiceError> {
    if !status.is_known() {
        return Err(ServiceError::ValidationError(format!(
            "status code {} is not assigned",
            status.code()
        )));
    }
    Ok(status.code())
}

/// Orders, their items and packaging boxes.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates an order with all of its items, or nothing.
    #[instrument(skip(self))]
    pub async fn create_order(&self, input: NewOrder) -> Result<order::Model, ServiceError> {
        input.validate()?;
        let status = writable_status(input.status)?;

        let txn = self.db_pool.begin().await?;
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            status: Set(status),
            site_id: Set(input.site_id),
            buyer_id: Set(input.buyer_id),
            seller_id: Set(input.seller_id),
            shipment_warehouse_id: Set(input.shipment_warehouse_id),
            dispatch_date: Set(None),
            handing_date: Set(None),
            delivery_order_id: Set(None),
            comment: Set(input.comment),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "order"))?;

        for item in input.items {
            let price = match item.price {
                Some(price) => price,
                None => {
                    product::Entity::find_by_id(item.product_id)
                        .one(&txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("product", item.product_id))?
                        .price
                }
            };
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                box_id: Set(item.box_id),
                quantity: Set(item.quantity),
                price: Set(price),
            }
            .insert(&txn)
            .await
            .map_err(|e| ServiceError::from_write(e, "order item"))?;
        }
        txn.commit().await?;

        info!(order_id = %order.id, status = %order.status(), "order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", id))
    }

    #[instrument(skip(self))]
    pub async fn items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn order_total(&self, order_id: Uuid) -> Result<Decimal, ServiceError> {
        Ok(self.items(order_id).await?.iter().map(|i| i.total()).sum())
    }

    /// Only assigned codes may be written; orders already holding an unknown code keep it
    /// until changed.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<order::Model, ServiceError> {
        let code = writable_status(status)?;
        let mut active: order::ActiveModel = self.get_order(id).await?.into();
        active.status = Set(code);
        let model = active.update(&*self.db_pool).await?;
        info!(order_id = %id, %status, "order status changed");
        Ok(model)
    }

    /// Orders in any of the given statuses, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_statuses(&self, statuses: &[OrderStatus]) -> Result<Vec<order::Model>, ServiceError> {
        let codes: Vec<i32> = statuses.iter().map(|s| s.code()).collect();
        Ok(order::Entity::find()
            .filter(order::Column::Status.is_in(codes))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn set_delivery(&self, id: Uuid, delivery: DeliveryInfo) -> Result<order::Model, ServiceError> {
        if let (Some(dispatch), Some(handing)) = (delivery.dispatch_date, delivery.handing_date) {
            if handing < dispatch {
                return Err(ServiceError::ValidationError(
                    "handing date precedes dispatch date".into(),
                ));
            }
        }
        let mut active: order::ActiveModel = self.get_order(id).await?.into();
        active.dispatch_date = Set(delivery.dispatch_date);
        active.handing_date = Set(delivery.handing_date);
        active.delivery_order_id = Set(delivery.delivery_order_id);
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_shipment_warehouse(
        &self,
        id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> Result<order::Model, ServiceError> {
        let mut active: order::ActiveModel = self.get_order(id).await?.into();
        active.shipment_warehouse_id = Set(warehouse_id);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "order"))
    }

    #[instrument(skip(self))]
    pub async fn create_box(&self, name: &str, product_id: Option<Uuid>) -> Result<shipping_box::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError("box name must not be empty".into()));
        }
        let model = shipping_box::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            product_id: Set(product_id),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "box"))?;
        info!(box_id = %model.id, "box created");
        Ok(model)
    }

    /// Items packed in the box are kept and simply lose the box.
    #[instrument(skip(self))]
    pub async fn delete_box(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = shipping_box::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "box", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("box", id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn assign_box(&self, item_id: Uuid, box_id: Option<Uuid>) -> Result<order_item::Model, ServiceError> {
        let item = order_item::Entity::find_by_id(item_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("order item", item_id))?;
        let mut active: order_item::ActiveModel = item.into();
        active.box_id = Set(box_id);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "order item"))
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = order::Entity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("order", id));
        }
        info!(order_id = %id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unknown_status_is_not_writable() {
        assert_eq!(writable_status(OrderStatus::Problem).unwrap(), 4096);
        assert_matches!(
            writable_status(OrderStatus::Unknown(3)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn items_are_validated_with_the_order() {
        let order = NewOrder {
            site_id: Uuid::new_v4(),
            buyer_id: None,
            seller_id: None,
            shipment_warehouse_id: None,
            status: OrderStatus::New,
            comment: None,
            items: vec![NewOrderItem {
                product_id: Uuid::new_v4(),
                quantity: 0,
                price: None,
                box_id: None,
            }],
        };
        assert!(order.validate().is_err());
    }
}
