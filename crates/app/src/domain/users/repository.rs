//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::try_get_variant,
    domain::{
        pagination::PageRequest,
        users::models::{Role, User, UserUpdate, UserUuid},
    },
};

const LIST_USERS_SQL: &str = include_str!("sql/list_users.sql");
const COUNT_USERS_SQL: &str = include_str!("sql/count_users.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const UPDATE_PROFILE_SQL: &str = include_str!("sql/update_profile.sql");
const UPDATE_ROLE_SQL: &str = include_str!("sql/update_role.sql");
const DELETE_USER_SQL: &str = include_str!("sql/delete_user.sql");
const COUNT_ALL_USERS_SQL: &str = include_str!("sql/count_all_users.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_users(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let users = query_as::<Postgres, User>(LIST_USERS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_USERS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((users, total))
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_profile(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        update: &UserUpdate,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(UPDATE_PROFILE_SQL)
            .bind(user.into_uuid())
            .bind(&update.name)
            .bind(&update.phone)
            .bind(&update.address)
            .bind(&update.avatar_url)
            .bind(update.date_of_birth.map(SqlxTimestamp::from))
            .bind(&update.country)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(UPDATE_ROLE_SQL)
            .bind(user.into_uuid())
            .bind(role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_USER_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_ALL_USERS_SQL)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            avatar_url: row.try_get("avatar_url")?,
            date_of_birth: row
                .try_get::<Option<SqlxTimestamp>, _>("date_of_birth")?
                .map(SqlxTimestamp::to_jiff),
            country: row.try_get("country")?,
            role: try_get_variant(row, "role", Role::parse)?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
