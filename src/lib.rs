//! Storefront data layer
//!
//! Catalog, order, supplier and marketplace schema for the storefront, together with
//! the services that mutate it, the Russian full-text search analyzer and the
//! template-facing text helpers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod migrator;
pub mod search;
pub mod services;
pub mod text;

pub use errors::ServiceError;

/// Result alias used by every service operation.
pub type ServiceResult<T> = Result<T, ServiceError>;
