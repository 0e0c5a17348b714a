//! Auth data models.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::token::TokenKind,
    domain::users::models::{Role, User, UserUuid},
};

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_uuid: UserUuid,
    pub role: Role,
}

impl AuthenticatedUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub phone: Option<String>,
}

/// Staff account payload used by admin provisioning.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

/// One-time raw tokens handed to the client at login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful credential check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    #[serde(flatten)]
    pub tokens: IssuedTokens,
    pub user: User,
}

/// A user row together with its credential material. Never serialized.
#[derive(Debug, Clone)]
pub(crate) struct CredentialUser {
    pub user: User,
    pub password_hash: String,
    pub password_salt: String,
    pub verification_code: Option<String>,
    pub verification_code_expires_at: Option<Timestamp>,
}

/// Token row persisted in storage.
#[derive(Debug, Clone)]
pub(crate) struct StoredAuthToken {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub kind: TokenKind,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// New token persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewAuthToken {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub kind: TokenKind,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
