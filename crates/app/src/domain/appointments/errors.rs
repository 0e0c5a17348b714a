//! Appointments service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppointmentsServiceError {
    #[error("appointment not found")]
    NotFound,

    #[error("calendar computation failed")]
    Time(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AppointmentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
