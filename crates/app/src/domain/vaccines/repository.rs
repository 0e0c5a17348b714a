//! Vaccines Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::{
        pagination::PageRequest,
        vaccines::models::{NewVaccine, Vaccine, VaccineUpdate, VaccineUuid},
    },
};

const LIST_VACCINES_SQL: &str = include_str!("sql/list_vaccines.sql");
const COUNT_VACCINES_SQL: &str = include_str!("sql/count_vaccines.sql");
const GET_VACCINE_SQL: &str = include_str!("sql/get_vaccine.sql");
const NAME_CONFLICT_SQL: &str = include_str!("sql/name_conflict.sql");
const CREATE_VACCINE_SQL: &str = include_str!("sql/create_vaccine.sql");
const UPDATE_VACCINE_SQL: &str = include_str!("sql/update_vaccine.sql");
const DELETE_VACCINE_SQL: &str = include_str!("sql/delete_vaccine.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVaccinesRepository;

impl PgVaccinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_vaccines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Vaccine>, i64), sqlx::Error> {
        let vaccines = query_as::<Postgres, Vaccine>(LIST_VACCINES_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_VACCINES_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((vaccines, total))
    }

    pub(crate) async fn get_vaccine(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
    ) -> Result<Vaccine, sqlx::Error> {
        query_as::<Postgres, Vaccine>(GET_VACCINE_SQL)
            .bind(vaccine.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// True when another vaccine already uses this name, case-insensitively.
    pub(crate) async fn name_conflicts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        exclude: Option<VaccineUuid>,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(NAME_CONFLICT_SQL)
            .bind(name)
            .bind(exclude.map(Into::<Uuid>::into))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_vaccine(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
        batch_number: &str,
        new: &NewVaccine,
    ) -> Result<Vaccine, sqlx::Error> {
        query_as::<Postgres, Vaccine>(CREATE_VACCINE_SQL)
            .bind(vaccine.into_uuid())
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.image_url)
            .bind(amount_to_i64(new.price, "price")?)
            .bind(amount_to_i64(new.initial_quantity, "remaining_quantity")?)
            .bind(batch_number)
            .bind(SqlxTimestamp::from(new.expiration_date))
            .bind(&new.location)
            .bind(new.manufacturer_uuid.map(Into::<Uuid>::into))
            .bind(new.supplier_uuid.map(Into::<Uuid>::into))
            .bind(new.category_uuid.map(Into::<Uuid>::into))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_vaccine(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
        update: &VaccineUpdate,
    ) -> Result<Vaccine, sqlx::Error> {
        query_as::<Postgres, Vaccine>(UPDATE_VACCINE_SQL)
            .bind(vaccine.into_uuid())
            .bind(&update.name)
            .bind(&update.description)
            .bind(&update.image_url)
            .bind(amount_to_i64(update.price, "price")?)
            .bind(amount_to_i64(update.remaining_quantity, "remaining_quantity")?)
            .bind(SqlxTimestamp::from(update.expiration_date))
            .bind(&update.location)
            .bind(update.manufacturer_uuid.map(Into::<Uuid>::into))
            .bind(update.supplier_uuid.map(Into::<Uuid>::into))
            .bind(update.category_uuid.map(Into::<Uuid>::into))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_vaccine(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_VACCINE_SQL)
            .bind(vaccine.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Vaccine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VaccineUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            price: try_get_amount(row, "price")?,
            remaining_quantity: try_get_amount(row, "remaining_quantity")?,
            batch_number: row.try_get("batch_number")?,
            expiration_date: row.try_get::<SqlxTimestamp, _>("expiration_date")?.to_jiff(),
            location: row.try_get("location")?,
            manufacturer_uuid: row
                .try_get::<Option<Uuid>, _>("manufacturer_uuid")?
                .map(Into::into),
            supplier_uuid: row
                .try_get::<Option<Uuid>, _>("supplier_uuid")?
                .map(Into::into),
            category_uuid: row
                .try_get::<Option<Uuid>, _>("category_uuid")?
                .map(Into::into),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
