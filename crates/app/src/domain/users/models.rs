//! User Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Account role, checked by the HTTP layer on privileged routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Employee,
    Doctor,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Employee => "EMPLOYEE",
            Self::Doctor => "DOCTOR",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Self::User),
            "EMPLOYEE" => Some(Self::Employee),
            "DOCTOR" => Some(Self::Doctor),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// User Model. Credential material never leaves the auth module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uuid: UserUuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<Timestamp>,
    pub country: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Profile Update Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<Timestamp>,
    pub country: Option<String>,
}
