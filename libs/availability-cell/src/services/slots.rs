// libs/availability-cell/src/services/slots.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{AvailabilitySlot, CreateSlotRequest, SlotError, UpdateSlotRequest};

pub struct SlotService {
    supabase: SupabaseClient,
}

impl SlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Publish a new unbooked slot for a professor.
    ///
    /// The (professor_id, start_time) pair is unique-indexed in storage; the
    /// insert surfaces 409 on a collision rather than racing a read-then-write
    /// duplicate check.
    pub async fn create_slot(
        &self,
        professor_id: Uuid,
        request: CreateSlotRequest,
    ) -> Result<AvailabilitySlot, SlotError> {
        debug!("Creating slot for professor: {}", professor_id);

        if request.start_time >= request.end_time {
            return Err(SlotError::InvalidRange);
        }

        let now = Utc::now();
        let slot_data = json!({
            "professor_id": professor_id,
            "start_time": request.start_time.to_rfc3339(),
            "end_time": request.end_time.to_rfc3339(),
            "is_booked": false,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/availability_slots",
                Some(slot_data),
                Some(headers),
            )
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => SlotError::DuplicateSlot,
                other => SlotError::Database(other.to_string()),
            })?;

        if result.is_empty() {
            return Err(SlotError::Database("Failed to create slot".to_string()));
        }

        let slot: AvailabilitySlot = serde_json::from_value(result[0].clone())
            .map_err(|e| SlotError::Database(format!("Failed to parse slot: {}", e)))?;
        debug!("Slot created with ID: {}", slot.id);

        Ok(slot)
    }

    /// Open slots for a professor, soonest first. This is the student-facing
    /// view.
    pub async fn list_open_slots(&self, professor_id: Uuid) -> Result<Vec<AvailabilitySlot>, SlotError> {
        let path = format!(
            "/rest/v1/availability_slots?professor_id=eq.{}&is_booked=eq.false&order=start_time.asc",
            professor_id
        );

        self.fetch_slots(&path).await
    }

    /// Every slot a professor owns, booked or not, soonest first.
    pub async fn list_professor_slots(
        &self,
        professor_id: Uuid,
    ) -> Result<Vec<AvailabilitySlot>, SlotError> {
        let path = format!(
            "/rest/v1/availability_slots?professor_id=eq.{}&order=start_time.asc",
            professor_id
        );

        self.fetch_slots(&path).await
    }

    /// Overwrite the times on an unbooked slot owned by the professor.
    pub async fn update_slot(
        &self,
        professor_id: Uuid,
        slot_id: Uuid,
        request: UpdateSlotRequest,
    ) -> Result<AvailabilitySlot, SlotError> {
        debug!("Updating slot {} for professor {}", slot_id, professor_id);

        let current = self.get_owned_slot(professor_id, slot_id).await?;
        if current.is_booked {
            return Err(SlotError::SlotLocked);
        }

        if request.start_time >= request.end_time {
            return Err(SlotError::InvalidRange);
        }

        // The filter re-asserts ownership and the unbooked state so a claim
        // racing in after the fetch cannot be overwritten.
        let path = format!(
            "/rest/v1/availability_slots?id=eq.{}&professor_id=eq.{}&is_booked=eq.false",
            slot_id, professor_id
        );

        let update_data = json!({
            "start_time": request.start_time.to_rfc3339(),
            "end_time": request.end_time.to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(update_data), Some(headers))
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        if result.is_empty() {
            // The slot was claimed between the fetch and the update.
            return Err(SlotError::SlotLocked);
        }

        let updated: AvailabilitySlot = serde_json::from_value(result[0].clone())
            .map_err(|e| SlotError::Database(format!("Failed to parse slot: {}", e)))?;
        Ok(updated)
    }

    /// Remove an unbooked slot owned by the professor.
    pub async fn delete_slot(&self, professor_id: Uuid, slot_id: Uuid) -> Result<(), SlotError> {
        debug!("Deleting slot {} for professor {}", slot_id, professor_id);

        let current = self.get_owned_slot(professor_id, slot_id).await?;
        if current.is_booked {
            return Err(SlotError::SlotLocked);
        }

        let path = format!(
            "/rest/v1/availability_slots?id=eq.{}&professor_id=eq.{}&is_booked=eq.false",
            slot_id, professor_id
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(headers))
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(SlotError::SlotLocked);
        }

        Ok(())
    }

    /// Atomically flip a slot from open to booked.
    ///
    /// The whole transition is a single conditional update evaluated by the
    /// storage layer: "set is_booked=true where id=X and is_booked=false,
    /// return the changed row". Under N concurrent claims on one slot exactly
    /// one response carries the row; the rest see an empty result and fail
    /// with `ClaimFailed` without any partial state.
    pub async fn claim_slot(&self, slot_id: Uuid) -> Result<AvailabilitySlot, SlotError> {
        debug!("Claiming slot: {}", slot_id);

        let path = format!(
            "/rest/v1/availability_slots?id=eq.{}&is_booked=eq.false",
            slot_id
        );

        let claim_data = json!({
            "is_booked": true,
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(claim_data), Some(headers))
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        if result.is_empty() {
            // Already booked, or no such slot; indistinguishable by design.
            return Err(SlotError::ClaimFailed);
        }

        let slot: AvailabilitySlot = serde_json::from_value(result[0].clone())
            .map_err(|e| SlotError::Database(format!("Failed to parse slot: {}", e)))?;
        debug!("Slot {} claimed", slot.id);

        Ok(slot)
    }

    /// Re-open a slot unconditionally. Idempotent: releasing an already-open
    /// or missing slot is not an error.
    pub async fn release_slot(&self, slot_id: Uuid) -> Result<(), SlotError> {
        debug!("Releasing slot: {}", slot_id);

        let path = format!("/rest/v1/availability_slots?id=eq.{}", slot_id);

        let release_data = json!({
            "is_booked": false,
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(release_data), Some(headers))
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        if result.is_empty() {
            warn!("Release of slot {} matched no row", slot_id);
        }

        Ok(())
    }

    // Private helper methods

    async fn fetch_slots(&self, path: &str) -> Result<Vec<AvailabilitySlot>, SlotError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        let slots: Vec<AvailabilitySlot> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AvailabilitySlot>, _>>()
            .map_err(|e| SlotError::Database(format!("Failed to parse slots: {}", e)))?;

        Ok(slots)
    }

    async fn get_owned_slot(
        &self,
        professor_id: Uuid,
        slot_id: Uuid,
    ) -> Result<AvailabilitySlot, SlotError> {
        let path = format!(
            "/rest/v1/availability_slots?id=eq.{}&professor_id=eq.{}",
            slot_id, professor_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| SlotError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(SlotError::NotFound);
        }

        let slot: AvailabilitySlot = serde_json::from_value(result[0].clone())
            .map_err(|e| SlotError::Database(format!("Failed to parse slot: {}", e)))?;
        Ok(slot)
    }
}
