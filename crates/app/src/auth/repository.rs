//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    auth::{
        models::{CredentialUser, NewAuthToken, StoredAuthToken},
        token::TokenKind,
    },
    database::try_get_variant,
    domain::users::models::{Role, User, UserUuid},
};

const FIND_CREDENTIAL_BY_EMAIL_SQL: &str = include_str!("sql/find_credential_by_email.sql");
const FIND_CREDENTIAL_BY_UUID_SQL: &str = include_str!("sql/find_credential_by_uuid.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const SET_VERIFICATION_CODE_SQL: &str = include_str!("sql/set_verification_code.sql");
const MARK_VERIFIED_SQL: &str = include_str!("sql/mark_verified.sql");
const UPDATE_PASSWORD_SQL: &str = include_str!("sql/update_password.sql");
const CREATE_AUTH_TOKEN_SQL: &str = include_str!("sql/create_auth_token.sql");
const FIND_AUTH_TOKEN_SQL: &str = include_str!("sql/find_auth_token.sql");
const REVOKE_AUTH_TOKEN_SQL: &str = include_str!("sql/revoke_auth_token.sql");
const TOUCH_AUTH_TOKEN_SQL: &str = include_str!("sql/touch_auth_token.sql");
const COUNT_ACCOUNTS_SQL: &str = include_str!("sql/count_accounts.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgAuthRepository {
    pool: PgPool,
}

pub(crate) struct NewCredentialUser<'a> {
    pub uuid: UserUuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub password_salt: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub role: Role,
    pub is_verified: bool,
    pub verification_code: Option<&'a str>,
    pub verification_code_expires_at: Option<jiff::Timestamp>,
}

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialUser>, sqlx::Error> {
        query_as::<Postgres, CredentialUser>(FIND_CREDENTIAL_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn find_credential_by_uuid(
        &self,
        user: UserUuid,
    ) -> Result<Option<CredentialUser>, sqlx::Error> {
        query_as::<Postgres, CredentialUser>(FIND_CREDENTIAL_BY_UUID_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn create_user(
        &self,
        new: &NewCredentialUser<'_>,
    ) -> Result<CredentialUser, sqlx::Error> {
        query_as::<Postgres, CredentialUser>(CREATE_USER_SQL)
            .bind(new.uuid.into_uuid())
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.password_salt)
            .bind(new.name)
            .bind(new.phone)
            .bind(new.role.as_str())
            .bind(new.is_verified)
            .bind(new.verification_code)
            .bind(new.verification_code_expires_at.map(SqlxTimestamp::from))
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn set_verification_code(
        &self,
        email: &str,
        code: &str,
        expires_at: jiff::Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_VERIFICATION_CODE_SQL)
            .bind(email)
            .bind(code)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_verified(&self, email: &str) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_VERIFIED_SQL)
            .bind(email)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn update_password(
        &self,
        user: UserUuid,
        password_hash: &str,
        password_salt: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_PASSWORD_SQL)
            .bind(user.into_uuid())
            .bind(password_hash)
            .bind(password_salt)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn create_auth_token(&self, token: &NewAuthToken) -> Result<(), sqlx::Error> {
        query(CREATE_AUTH_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.user_uuid.into_uuid())
            .bind(token.kind.as_str())
            .bind(&token.token_hash)
            .bind(SqlxTimestamp::from(token.expires_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub(crate) async fn find_auth_token(
        &self,
        token_uuid: Uuid,
        kind: TokenKind,
    ) -> Result<Option<StoredAuthToken>, sqlx::Error> {
        query_as::<Postgres, StoredAuthToken>(FIND_AUTH_TOKEN_SQL)
            .bind(token_uuid)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
    }

    /// Revoke a token. Returns `true` when the token was still active.
    pub(crate) async fn revoke_auth_token(&self, token_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let rows_affected = query(REVOKE_AUTH_TOKEN_SQL)
            .bind(token_uuid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn touch_auth_token(&self, token_uuid: Uuid) -> Result<(), sqlx::Error> {
        query(TOUCH_AUTH_TOKEN_SQL)
            .bind(token_uuid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub(crate) async fn count_accounts(&self) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_ACCOUNTS_SQL)
            .fetch_one(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CredentialUser {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: User {
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
            },
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
            verification_code: row.try_get("verification_code")?,
            verification_code_expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("verification_code_expires_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StoredAuthToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get("uuid")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            kind: try_get_variant(row, "kind", TokenKind::parse)?,
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
