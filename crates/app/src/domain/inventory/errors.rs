//! Inventory service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("storage error")]
    Sql(#[from] Error),
}
