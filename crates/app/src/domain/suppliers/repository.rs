//! Suppliers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    pagination::PageRequest,
    suppliers::models::{NewSupplier, Supplier, SupplierUuid},
};

const LIST_SUPPLIERS_SQL: &str = include_str!("sql/list_suppliers.sql");
const COUNT_SUPPLIERS_SQL: &str = include_str!("sql/count_suppliers.sql");
const GET_SUPPLIER_SQL: &str = include_str!("sql/get_supplier.sql");
const CREATE_SUPPLIER_SQL: &str = include_str!("sql/create_supplier.sql");
const UPDATE_SUPPLIER_SQL: &str = include_str!("sql/update_supplier.sql");
const DELETE_SUPPLIER_SQL: &str = include_str!("sql/delete_supplier.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSuppliersRepository;

impl PgSuppliersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_suppliers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Supplier>, i64), sqlx::Error> {
        let suppliers = query_as::<Postgres, Supplier>(LIST_SUPPLIERS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_SUPPLIERS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((suppliers, total))
    }

    pub(crate) async fn get_supplier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        supplier: SupplierUuid,
    ) -> Result<Supplier, sqlx::Error> {
        query_as::<Postgres, Supplier>(GET_SUPPLIER_SQL)
            .bind(supplier.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_supplier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        supplier: SupplierUuid,
        new: &NewSupplier,
    ) -> Result<Supplier, sqlx::Error> {
        query_as::<Postgres, Supplier>(CREATE_SUPPLIER_SQL)
            .bind(supplier.into_uuid())
            .bind(&new.name)
            .bind(&new.contact_info)
            .bind(&new.address)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_supplier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        supplier: SupplierUuid,
        update: &NewSupplier,
    ) -> Result<Supplier, sqlx::Error> {
        query_as::<Postgres, Supplier>(UPDATE_SUPPLIER_SQL)
            .bind(supplier.into_uuid())
            .bind(&update.name)
            .bind(&update.contact_info)
            .bind(&update.address)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_supplier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        supplier: SupplierUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SUPPLIER_SQL)
            .bind(supplier.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Supplier {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SupplierUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            contact_info: row.try_get("contact_info")?,
            address: row.try_get("address")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
