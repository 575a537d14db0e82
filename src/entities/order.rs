use crate::domain::OrderStatus;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Raw status code; see [`OrderStatus`].
    pub status: i32,
    pub site_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub shipment_warehouse_id: Option<Uuid>,
    pub dispatch_date: Option<NaiveDate>,
    pub handing_date: Option<NaiveDate>,
    /// Order id in the delivery service.
    pub delivery_order_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_code(self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::Id",
        on_delete = "Cascade"
    )]
    Site,
    #[sea_orm(
        belongs_to = "super::contractor::Entity",
        from = "Column::BuyerId",
        to = "super::contractor::Column::Id",
        on_delete = "SetNull"
    )]
    Buyer,
    #[sea_orm(
        belongs_to = "super::contractor::Entity",
        from = "Column::SellerId",
        to = "super::contractor::Column::Id",
        on_delete = "SetNull"
    )]
    Seller,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::ShipmentWarehouseId",
        to = "super::supplier::Column::Id",
        on_delete = "NoAction"
    )]
    ShipmentWarehouse,
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
