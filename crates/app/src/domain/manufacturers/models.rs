//! Manufacturer Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// Manufacturer UUID
pub type ManufacturerUuid = TypedUuid<Manufacturer>;

/// Manufacturer Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub uuid: ManufacturerUuid,
    pub name: String,
    pub country: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Manufacturer Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManufacturer {
    pub name: String,
    pub country: Option<String>,
}
