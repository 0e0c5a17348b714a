//! Supplier Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// Supplier UUID
pub type SupplierUuid = TypedUuid<Supplier>;

/// Supplier Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub uuid: SupplierUuid,
    pub name: String,
    pub contact_info: Option<String>,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Supplier Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub contact_info: Option<String>,
    pub address: Option<String>,
}
