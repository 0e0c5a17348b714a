//! Blog posts

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::PostsServiceError;
pub use service::*;
