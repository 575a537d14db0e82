//! Value types shared by entities and services.

pub mod admin_fields;
pub mod color;
pub mod country_role;
pub mod gtin;
pub mod marketplace;
pub mod order_status;
pub mod stock_policy;

pub use admin_fields::{AdminField, AdminFieldConfig, AdminFieldError};
pub use color::{ColorError, DisplayColor};
pub use country_role::CountryRole;
pub use gtin::{Gtin, GtinError, Gtins};
pub use marketplace::{MarketplaceExport, MarketplaceExports};
pub use order_status::OrderStatus;
pub use stock_policy::{MarketplaceAvailability, StockReportPolicy};
