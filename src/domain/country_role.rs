use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which of a product's two country lists a link belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CountryRole {
    #[sea_orm(string_value = "manufacture")]
    Manufacture,
    #[sea_orm(string_value = "development")]
    Development,
}
