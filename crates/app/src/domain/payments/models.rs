//! Payment Models

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{bookings::models::BookingUuid, users::models::UserUuid},
    ids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<Payment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CASH" => Some(Self::Cash),
            "CREDIT_CARD" => Some(Self::CreditCard),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment Model.
///
/// `order_id` is set only on gateway payments; its uniqueness is the
/// idempotency boundary for gateway callbacks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub uuid: PaymentUuid,
    pub booking_uuid: BookingUuid,
    pub user_uuid: UserUuid,
    pub amount: u64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub order_id: Option<String>,
    pub appointment_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A gateway order handed back to the client for checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    pub partner_code: String,
    pub order_id: String,
    pub amount: u64,
    pub request_id: String,
    pub pay_url: String,
}

/// One row of a user's payment history, joined with its booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPaymentSummary {
    pub payment_uuid: PaymentUuid,
    pub booking_uuid: BookingUuid,
    pub appointment_date: Option<Timestamp>,
    pub quantity: u64,
    pub total_amount: u64,
    pub vaccine_name: String,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub created_at: Timestamp,
}
