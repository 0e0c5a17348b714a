//! Tags Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    pagination::PageRequest,
    tags::models::{NewTag, Tag, TagUuid},
};

const LIST_TAGS_SQL: &str = include_str!("sql/list_tags.sql");
const COUNT_TAGS_SQL: &str = include_str!("sql/count_tags.sql");
const GET_TAG_SQL: &str = include_str!("sql/get_tag.sql");
const CREATE_TAG_SQL: &str = include_str!("sql/create_tag.sql");
const UPDATE_TAG_SQL: &str = include_str!("sql/update_tag.sql");
const DELETE_TAG_SQL: &str = include_str!("sql/delete_tag.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTagsRepository;

impl PgTagsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_tags(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Tag>, i64), sqlx::Error> {
        let tags = query_as::<Postgres, Tag>(LIST_TAGS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_TAGS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((tags, total))
    }

    pub(crate) async fn get_tag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tag: TagUuid,
    ) -> Result<Tag, sqlx::Error> {
        query_as::<Postgres, Tag>(GET_TAG_SQL)
            .bind(tag.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_tag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tag: TagUuid,
        new: &NewTag,
    ) -> Result<Tag, sqlx::Error> {
        query_as::<Postgres, Tag>(CREATE_TAG_SQL)
            .bind(tag.into_uuid())
            .bind(&new.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_tag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tag: TagUuid,
        update: &NewTag,
    ) -> Result<Tag, sqlx::Error> {
        query_as::<Postgres, Tag>(UPDATE_TAG_SQL)
            .bind(tag.into_uuid())
            .bind(&update.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_tag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tag: TagUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_TAG_SQL)
            .bind(tag.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Tag {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TagUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
