//! Suppliers

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::SuppliersServiceError;
pub use service::*;
