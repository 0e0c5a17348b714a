//! Categories Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    categories::models::{Category, CategoryUuid, NewCategory},
    pagination::PageRequest,
};

const LIST_CATEGORIES_SQL: &str = include_str!("sql/list_categories.sql");
const COUNT_CATEGORIES_SQL: &str = include_str!("sql/count_categories.sql");
const GET_CATEGORY_SQL: &str = include_str!("sql/get_category.sql");
const CREATE_CATEGORY_SQL: &str = include_str!("sql/create_category.sql");
const UPDATE_CATEGORY_SQL: &str = include_str!("sql/update_category.sql");
const DELETE_CATEGORY_SQL: &str = include_str!("sql/delete_category.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Category>, i64), sqlx::Error> {
        let categories = query_as::<Postgres, Category>(LIST_CATEGORIES_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_CATEGORIES_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((categories, total))
    }

    pub(crate) async fn get_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<Category, sqlx::Error> {
        query_as::<Postgres, Category>(GET_CATEGORY_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        new: &NewCategory,
    ) -> Result<Category, sqlx::Error> {
        query_as::<Postgres, Category>(CREATE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .bind(&new.name)
            .bind(&new.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        update: &NewCategory,
    ) -> Result<Category, sqlx::Error> {
        query_as::<Postgres, Category>(UPDATE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .bind(&update.name)
            .bind(&update.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Category {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
