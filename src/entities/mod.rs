//! SeaORM entities, one module per table.

pub mod category;
pub mod contractor;
pub mod country;
pub mod courier;
pub mod currency;
pub mod integration;
pub mod manager;
pub mod marketplace;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_category;
pub mod product_country;
pub mod product_gtin;
pub mod product_marketplace;
pub mod product_review;
pub mod shipping_box;
pub mod site;
pub mod stock;
pub mod supplier;
