use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marketplaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_marketplace::Entity")]
    ProductMarketplace,
}

impl Related<super::product_marketplace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductMarketplace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
