//! Vaccine Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        categories::models::CategoryUuid, manufacturers::models::ManufacturerUuid,
        suppliers::models::SupplierUuid,
    },
    ids::TypedUuid,
};

/// Vaccine UUID
pub type VaccineUuid = TypedUuid<Vaccine>;

/// Vaccine Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub uuid: VaccineUuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: u64,
    pub remaining_quantity: u64,
    pub batch_number: String,
    pub expiration_date: Timestamp,
    pub location: Option<String>,
    pub manufacturer_uuid: Option<ManufacturerUuid>,
    pub supplier_uuid: Option<SupplierUuid>,
    pub category_uuid: Option<CategoryUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Vaccine Model. The batch number is generated at creation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVaccine {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: u64,
    pub initial_quantity: u64,
    pub expiration_date: Timestamp,
    pub location: Option<String>,
    pub manufacturer_uuid: Option<ManufacturerUuid>,
    pub supplier_uuid: Option<SupplierUuid>,
    pub category_uuid: Option<CategoryUuid>,
}

/// Vaccine Update Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccineUpdate {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: u64,
    pub remaining_quantity: u64,
    pub expiration_date: Timestamp,
    pub location: Option<String>,
    pub manufacturer_uuid: Option<ManufacturerUuid>,
    pub supplier_uuid: Option<SupplierUuid>,
    pub category_uuid: Option<CategoryUuid>,
}

/// Remaining stock per vaccine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub vaccine_uuid: VaccineUuid,
    pub name: String,
    pub remaining_quantity: u64,
}
