use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A legal entity imported from the 1C accounting system.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identifier in 1C; the import matches rows on it.
    #[sea_orm(unique)]
    pub code_1c: String,
    pub name: String,
    pub inn: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
