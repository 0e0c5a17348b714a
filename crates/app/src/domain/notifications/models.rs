//! Notification Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::users::models::UserUuid, ids::TypedUuid};

/// Notification UUID
pub type NotificationUuid = TypedUuid<Notification>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Reminder,
    System,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reminder => "REMINDER",
            Self::System => "SYSTEM",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "REMINDER" => Some(Self::Reminder),
            "SYSTEM" => Some(Self::System),
            _ => None,
        }
    }
}

/// Notification Model. Append-only log of messages sent to a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub uuid: NotificationUuid,
    pub user_uuid: UserUuid,
    pub message: String,
    pub kind: NotificationKind,
    pub sent_at: Timestamp,
    pub is_read: bool,
}
