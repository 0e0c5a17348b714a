//! Booking Models

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{users::models::UserUuid, vaccines::models::VaccineUuid},
    ids::TypedUuid,
};

/// Booking UUID
pub type BookingUuid = TypedUuid<Booking>;

/// Lifecycle state of a booking.
///
/// `Pending` bookings hold reserved stock until confirmed or swept;
/// `WaitingPayment` bookings have a payment row; `Confirmed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    WaitingPayment,
    Confirmed,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::WaitingPayment => "WAITING_PAYMENT",
            Self::Confirmed => "CONFIRMED",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "WAITING_PAYMENT" => Some(Self::WaitingPayment),
            "CONFIRMED" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking Model.
///
/// `unit_price` and `total_amount` are frozen at creation; later catalog
/// price changes never touch an existing booking. `confirmation_time` is
/// the confirmation deadline at creation and is overwritten with the
/// completion instant when a gateway payment succeeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub uuid: BookingUuid,
    pub user_uuid: UserUuid,
    pub vaccine_uuid: VaccineUuid,
    pub quantity: u64,
    pub unit_price: u64,
    pub total_amount: u64,
    pub status: BookingStatus,
    pub appointment_date: Timestamp,
    pub confirmation_time: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Booking Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub vaccine_uuid: VaccineUuid,

    #[serde(default = "default_quantity")]
    pub quantity: u64,

    pub appointment_date: Timestamp,
}

const fn default_quantity() -> u64 {
    1
}

/// A booking joined with its user and vaccine, as listed and emailed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_name: String,
    pub user_email: String,
    pub vaccine_name: String,
}
