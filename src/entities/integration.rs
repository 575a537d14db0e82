use crate::domain::{AdminFieldConfig, AdminFieldError};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An external system (delivery service, marketplace account, ...) configured from the admin.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub admin_fields: Json,
    pub uses_boxes: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn admin_field_config(&self) -> Result<AdminFieldConfig, AdminFieldError> {
        AdminFieldConfig::from_json(&self.admin_fields)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
