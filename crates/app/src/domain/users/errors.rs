//! Users service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("user not found")]
    NotFound,

    #[error("cannot change your own role")]
    CannotChangeOwnRole,

    #[error("cannot delete an admin account")]
    CannotDeleteAdmin,

    #[error("cannot delete your own account")]
    CannotDeleteSelf,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for UsersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
