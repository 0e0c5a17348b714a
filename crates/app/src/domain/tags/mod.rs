//! Tags

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::TagsServiceError;
pub use service::*;
