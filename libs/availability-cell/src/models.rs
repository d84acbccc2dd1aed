// libs/availability-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single bookable window published by a professor.
///
/// A slot is mutable (times) and deletable only while `is_booked` is false;
/// the flag flips to true exactly once per claim/release cycle through
/// `SlotService::claim_slot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub professor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SlotError {
    #[error("Start time must be before end time")]
    InvalidRange,

    #[error("A slot with this start time already exists")]
    DuplicateSlot,

    #[error("Cannot modify a booked slot")]
    SlotLocked,

    #[error("Slot not found")]
    NotFound,

    #[error("Slot already booked or not found")]
    ClaimFailed,

    #[error("Database error: {0}")]
    Database(String),
}
