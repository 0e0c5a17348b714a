//! Posts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    pagination::PageRequest,
    posts::models::{NewPost, Post, PostUuid},
    users::models::UserUuid,
};

const LIST_POSTS_SQL: &str = include_str!("sql/list_posts.sql");
const COUNT_POSTS_SQL: &str = include_str!("sql/count_posts.sql");
const GET_POST_SQL: &str = include_str!("sql/get_post.sql");
const CREATE_POST_SQL: &str = include_str!("sql/create_post.sql");
const UPDATE_POST_SQL: &str = include_str!("sql/update_post.sql");
const DELETE_POST_SQL: &str = include_str!("sql/delete_post.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPostsRepository;

impl PgPostsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_posts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Post>, i64), sqlx::Error> {
        let posts = query_as::<Postgres, Post>(LIST_POSTS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_POSTS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((posts, total))
    }

    pub(crate) async fn get_post(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post: PostUuid,
    ) -> Result<Post, sqlx::Error> {
        query_as::<Postgres, Post>(GET_POST_SQL)
            .bind(post.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_post(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post: PostUuid,
        author: UserUuid,
        new: &NewPost,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_POST_SQL)
            .bind(post.into_uuid())
            .bind(&new.title)
            .bind(&new.content)
            .bind(&new.image_url)
            .bind(author.into_uuid())
            .bind(new.tag_uuid.map(Into::<Uuid>::into))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_post(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post: PostUuid,
        update: &NewPost,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_POST_SQL)
            .bind(post.into_uuid())
            .bind(&update.title)
            .bind(&update.content)
            .bind(&update.image_url)
            .bind(update.tag_uuid.map(Into::<Uuid>::into))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_post(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post: PostUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_POST_SQL)
            .bind(post.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Post {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PostUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            image_url: row.try_get("image_url")?,
            author_uuid: UserUuid::from_uuid(row.try_get("author_uuid")?),
            author_name: row.try_get("author_name")?,
            tag_uuid: row.try_get::<Option<Uuid>, _>("tag_uuid")?.map(Into::into),
            tag_name: row.try_get("tag_name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
