//! Inventory Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_amount,
    domain::vaccines::models::{StockLevel, VaccineUuid},
};

const STOCK_SUMMARY_SQL: &str = include_str!("sql/stock_summary.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn stock_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<StockLevel>, sqlx::Error> {
        query_as::<Postgres, StockLevel>(STOCK_SUMMARY_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StockLevel {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            vaccine_uuid: VaccineUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            remaining_quantity: try_get_amount(row, "remaining_quantity")?,
        })
    }
}
