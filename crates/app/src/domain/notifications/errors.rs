//! Notifications service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationsServiceError {
    #[error("calendar computation failed")]
    Time(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[from] Error),
}
