//! Bookings service errors.

use sqlx::Error;
use thiserror::Error;

use crate::{
    domain::bookings::models::BookingStatus,
    mail::{MailError, qr::QrError},
};

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("vaccine not found")]
    VaccineNotFound,

    #[error("not enough vaccine doses available")]
    InsufficientStock,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("booking not found")]
    NotFound,

    #[error("booking belongs to a different user")]
    Forbidden,

    #[error("booking cannot be confirmed from status {0}")]
    InvalidState(BookingStatus),

    #[error("QR rendering failed")]
    Qr(#[from] QrError),

    #[error("confirmation email could not be sent")]
    Mail(#[from] MailError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for BookingsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
