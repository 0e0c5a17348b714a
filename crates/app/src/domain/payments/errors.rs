//! Payments service errors.

use sqlx::Error;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment not found")]
    NotFound,

    #[error("booking not found")]
    BookingNotFound,

    #[error("only CASH payments can be updated directly")]
    CashOnly,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
