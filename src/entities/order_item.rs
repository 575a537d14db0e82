use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub box_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
}

impl Model {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "NoAction"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::shipping_box::Entity",
        from = "Column::BoxId",
        to = "super::shipping_box::Column::Id",
        on_delete = "SetNull"
    )]
    ShippingBox,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::shipping_box::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingBox.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
