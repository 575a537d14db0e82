use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    /// ISO 3166-1 alpha-2
    pub iso_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_country::Entity")]
    ProductCountry,
}

impl Related<super::product_country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCountry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
