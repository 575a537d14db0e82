// Reference data
pub mod directory;
pub mod integrations;
pub mod staff;
pub mod suppliers;

// Catalog
pub mod catalog;
pub mod categories;
pub mod marketplaces;
pub mod reviews;
pub mod stock;

// Orders
pub mod orders;

// Service factory for dependency injection
pub mod factory;

pub use factory::{ServiceContainer, ServiceFactory};
