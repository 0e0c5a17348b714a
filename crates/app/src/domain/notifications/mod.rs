//! Notifications and reminders

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::NotificationsServiceError;
pub use service::*;
