//! Database connection management

use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

#[derive(Debug, Error)]
#[error("unrecognized {column} value {value:?}")]
struct UnknownVariant {
    column: &'static str,
    value: String,
}

/// Decode a `BIGINT` column that the model exposes as `u64`.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Encode a `u64` model value for a `BIGINT` bind parameter.
pub(crate) fn amount_to_i64(value: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Decode a `TEXT` column into one of the status/kind enums.
pub(crate) fn try_get_variant<T>(
    row: &PgRow,
    col: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(col)?;

    parse(&raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(UnknownVariant { column: col, value: raw }),
    })
}
