// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use availability_cell::models::AvailabilitySlot;

/// The record created as the second half of a successful slot claim.
///
/// student_id and professor_id are denormalized from the slot at creation so
/// the per-party listings never need a join back through the slot. At most
/// one appointment with `status == Booked` references a given slot at any
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub professor_id: Uuid,
    pub slot_id: Uuid,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Counterparty details attached to listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// An appointment with its slot and counterparty embedded, as returned by
/// the listing queries. Which party is populated depends on who is asking:
/// students get the professor, professors get the student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentWithDetails {
    pub id: Uuid,
    pub student_id: Uuid,
    pub professor_id: Uuid,
    pub slot_id: Uuid,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub student: Option<UserSummary>,
    #[serde(default)]
    pub professor: Option<UserSummary>,
    #[serde(default)]
    pub slot: Option<AvailabilitySlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot already booked or not found")]
    SlotUnavailable,

    #[error("Database error: {0}")]
    Database(String),
}
