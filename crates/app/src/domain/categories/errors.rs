//! Categories service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategoriesServiceError {
    #[error("category not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CategoriesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
