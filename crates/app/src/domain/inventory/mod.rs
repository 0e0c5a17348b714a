//! Inventory reporting

pub mod errors;
mod repository;
pub mod service;

pub use errors::InventoryServiceError;
pub use service::*;
