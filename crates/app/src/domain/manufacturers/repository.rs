//! Manufacturers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    manufacturers::models::{Manufacturer, ManufacturerUuid, NewManufacturer},
    pagination::PageRequest,
};

const LIST_MANUFACTURERS_SQL: &str = include_str!("sql/list_manufacturers.sql");
const COUNT_MANUFACTURERS_SQL: &str = include_str!("sql/count_manufacturers.sql");
const GET_MANUFACTURER_SQL: &str = include_str!("sql/get_manufacturer.sql");
const CREATE_MANUFACTURER_SQL: &str = include_str!("sql/create_manufacturer.sql");
const UPDATE_MANUFACTURER_SQL: &str = include_str!("sql/update_manufacturer.sql");
const DELETE_MANUFACTURER_SQL: &str = include_str!("sql/delete_manufacturer.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgManufacturersRepository;

impl PgManufacturersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_manufacturers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Manufacturer>, i64), sqlx::Error> {
        let manufacturers = query_as::<Postgres, Manufacturer>(LIST_MANUFACTURERS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_MANUFACTURERS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((manufacturers, total))
    }

    pub(crate) async fn get_manufacturer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        manufacturer: ManufacturerUuid,
    ) -> Result<Manufacturer, sqlx::Error> {
        query_as::<Postgres, Manufacturer>(GET_MANUFACTURER_SQL)
            .bind(manufacturer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_manufacturer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        manufacturer: ManufacturerUuid,
        new: &NewManufacturer,
    ) -> Result<Manufacturer, sqlx::Error> {
        query_as::<Postgres, Manufacturer>(CREATE_MANUFACTURER_SQL)
            .bind(manufacturer.into_uuid())
            .bind(&new.name)
            .bind(&new.country)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_manufacturer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        manufacturer: ManufacturerUuid,
        update: &NewManufacturer,
    ) -> Result<Manufacturer, sqlx::Error> {
        query_as::<Postgres, Manufacturer>(UPDATE_MANUFACTURER_SQL)
            .bind(manufacturer.into_uuid())
            .bind(&update.name)
            .bind(&update.country)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_manufacturer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        manufacturer: ManufacturerUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_MANUFACTURER_SQL)
            .bind(manufacturer.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Manufacturer {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ManufacturerUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            country: row.try_get("country")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
