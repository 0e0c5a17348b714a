//! Category Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Category Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub uuid: CategoryUuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Category Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}
