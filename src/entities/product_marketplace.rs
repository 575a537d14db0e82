use crate::domain::MarketplaceExport;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Export flag and price of a product on one marketplace.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_marketplaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub marketplace_code: String,
    pub enabled: bool,
    pub price: Option<Decimal>,
}

impl From<&Model> for MarketplaceExport {
    fn from(model: &Model) -> Self {
        MarketplaceExport {
            enabled: model.enabled,
            price: model.price,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::marketplace::Entity",
        from = "Column::MarketplaceCode",
        to = "super::marketplace::Column::Code",
        on_delete = "NoAction"
    )]
    Marketplace,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::marketplace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marketplace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
