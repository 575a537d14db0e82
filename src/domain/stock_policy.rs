use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a supplier's stock is reported to marketplaces.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockReportPolicy {
    /// The supplier's stock is not reported at all.
    #[default]
    #[sea_orm(string_value = "ignore")]
    Ignore,
    /// Quantities are reported as available.
    #[sea_orm(string_value = "availability")]
    Availability,
    /// Stock exists but is offered on back-order.
    #[sea_orm(string_value = "backorder")]
    Backorder,
}

/// What a marketplace feed says about one product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "quantity", rename_all = "snake_case")]
pub enum MarketplaceAvailability {
    InStock(i32),
    Backorder,
    OutOfStock,
}

impl MarketplaceAvailability {
    /// Aggregates `(policy, quantity)` pairs of every stock row of a product.
    ///
    /// Available quantities are summed; back-order suppliers only matter when nothing
    /// is available.
    pub fn aggregate<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (StockReportPolicy, i32)>,
    {
        let mut available = 0;
        let mut backorder = false;
        for (policy, quantity) in rows {
            if quantity <= 0 {
                continue;
            }
            match policy {
                StockReportPolicy::Ignore => {}
                StockReportPolicy::Availability => available += quantity,
                StockReportPolicy::Backorder => backorder = true,
            }
        }

        if available > 0 {
            MarketplaceAvailability::InStock(available)
        } else if backorder {
            MarketplaceAvailability::Backorder
        } else {
            MarketplaceAvailability::OutOfStock
        }
    }
}
