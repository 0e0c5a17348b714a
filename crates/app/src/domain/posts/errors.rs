//! Posts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("post not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PostsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            _ => Self::Sql(error),
        }
    }
}
