//! Appointments

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::AppointmentsServiceError;
pub use service::*;
