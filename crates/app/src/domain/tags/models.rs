//! Tag Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// Tag UUID
pub type TagUuid = TypedUuid<Tag>;

/// Tag Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub uuid: TagUuid,
    pub name: String,
    pub created_at: Timestamp,
}

/// New Tag Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTag {
    pub name: String,
}
