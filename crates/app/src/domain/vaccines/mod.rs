//! Vaccines

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::VaccinesServiceError;
pub use service::*;
