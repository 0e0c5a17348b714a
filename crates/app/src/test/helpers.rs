//! Shared test fixtures.

use jiff::{Timestamp, ToSpan};

use crate::domain::vaccines::models::NewVaccine;

/// A vaccine payload expiring far in the future.
pub(crate) fn new_vaccine(name: &str, price: u64, initial_quantity: u64) -> NewVaccine {
    NewVaccine {
        name: name.to_string(),
        description: None,
        image_url: None,
        price,
        initial_quantity,
        expiration_date: Timestamp::now().saturating_add((2 * 365 * 24).hours()),
        location: Some("Main clinic".to_string()),
        manufacturer_uuid: None,
        supplier_uuid: None,
        category_uuid: None,
    }
}
