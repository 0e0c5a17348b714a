//! Appointment Models

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{users::models::UserUuid, vaccines::models::VaccineUuid},
    ids::TypedUuid,
};

/// Appointment UUID
pub type AppointmentUuid = TypedUuid<Appointment>;

/// Clinical-visit state, kept in lockstep with the booking by explicit
/// updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
}

impl AppointmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment Model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub uuid: AppointmentUuid,
    pub user_uuid: UserUuid,
    pub vaccine_uuid: VaccineUuid,
    pub appointment_date: Timestamp,
    pub status: AppointmentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An appointment joined with its user and vaccine names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub user_name: String,
    pub user_email: String,
    pub vaccine_name: String,
}

/// Partial appointment update; omitted fields keep their value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub status: Option<AppointmentStatus>,
    pub appointment_date: Option<Timestamp>,
}

/// All appointments falling on one UTC calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: String,
    pub total: i64,
    pub appointments: Vec<AppointmentDetail>,
}
