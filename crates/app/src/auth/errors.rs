//! Auth service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{auth::token::AuthTokenError, mail::MailError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("invalid credentials or token")]
    Unauthorized,

    #[error("email already in use")]
    EmailTaken,

    #[error("password confirmation does not match")]
    PasswordMismatch,

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("new password must differ from the old one")]
    SamePassword,

    #[error("user not found")]
    NotFound,

    #[error("account is already verified")]
    AlreadyVerified,

    #[error("verification code is incorrect")]
    InvalidCode,

    #[error("verification code has expired")]
    CodeExpired,

    #[error("accounts already exist; refusing to bootstrap an admin")]
    AlreadyInitialized,

    #[error("token processing error")]
    Token(#[from] AuthTokenError),

    #[error("email delivery error")]
    Mail(#[from] MailError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::EmailTaken,
            _ => Self::Sql(error),
        }
    }
}
