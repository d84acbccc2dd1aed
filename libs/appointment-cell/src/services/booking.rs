// libs/appointment-cell/src/services/booking.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::models::SlotError;
use availability_cell::services::SlotService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, AppointmentWithDetails};

pub struct BookingService {
    supabase: SupabaseClient,
    slots: SlotService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            slots: SlotService::new(config),
        }
    }

    /// Book a slot for a student.
    ///
    /// The claim runs first and is the only atomic step: once it succeeds no
    /// other caller can claim the same slot until it is released, so two
    /// concurrent bookings can never both reach the insert. If the insert
    /// itself fails the claim is handed back (best effort) before the error
    /// surfaces, so the slot is not stranded in a booked-but-unappointed
    /// state.
    pub async fn book_appointment(
        &self,
        student_id: Uuid,
        slot_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking slot {} for student {}", slot_id, student_id);

        let slot = self.slots.claim_slot(slot_id).await.map_err(|e| match e {
            SlotError::ClaimFailed => AppointmentError::SlotUnavailable,
            other => AppointmentError::Database(other.to_string()),
        })?;

        let now = Utc::now();
        let appointment_data = json!({
            "student_id": student_id,
            "professor_id": slot.professor_id,
            "slot_id": slot.id,
            "status": AppointmentStatus::Booked.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let inserted: Result<Vec<Value>, _> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(appointment_data),
                Some(headers),
            )
            .await;

        let rows = match inserted {
            Ok(rows) if !rows.is_empty() => rows,
            other => {
                let message = match other {
                    Err(e) => e.to_string(),
                    Ok(_) => "Failed to create appointment".to_string(),
                };
                warn!(
                    "Appointment insert failed after claiming slot {}, releasing claim: {}",
                    slot_id, message
                );
                if let Err(release_err) = self.slots.release_slot(slot_id).await {
                    warn!("Failed to release slot {}: {}", slot_id, release_err);
                }
                return Err(AppointmentError::Database(message));
            }
        };

        let appointment: Appointment = serde_json::from_value(rows[0].clone())
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked for slot {}", appointment.id, slot_id);
        Ok(appointment)
    }

    /// A student's live appointments, newest first, with the professor and
    /// slot attached.
    pub async fn student_appointments(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        debug!("Fetching appointments for student: {}", student_id);

        let path = format!(
            "/rest/v1/appointments?student_id=eq.{}&status=eq.booked&select=*,professor:users!professor_id(id,full_name,email),slot:availability_slots(*)&order=created_at.desc",
            student_id
        );

        self.fetch_appointments(&path).await
    }

    /// A professor's live appointments, newest first, with the student and
    /// slot attached.
    pub async fn professor_appointments(
        &self,
        professor_id: Uuid,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        debug!("Fetching appointments for professor: {}", professor_id);

        let path = format!(
            "/rest/v1/appointments?professor_id=eq.{}&status=eq.booked&select=*,student:users!student_id(id,full_name,email),slot:availability_slots(*)&order=created_at.desc",
            professor_id
        );

        self.fetch_appointments(&path).await
    }

    /// Cancel a booked appointment and re-open its slot.
    ///
    /// The lookup filters on the owning professor and the live status, so a
    /// missing row, an already-cancelled appointment, and someone else's
    /// appointment all surface as the same `NotFound`.
    pub async fn cancel_appointment(
        &self,
        professor_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment {} for professor {}", appointment_id, professor_id);

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&professor_id=eq.{}&status=eq.booked",
            appointment_id, professor_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointment: {}", e)))?;

        // Flip the status, re-asserting it is still booked.
        let patch_path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.booked",
            appointment_id
        );

        let update_data = json!({
            "status": AppointmentStatus::Cancelled.to_string(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &patch_path, Some(update_data), Some(headers))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if updated.is_empty() {
            // Cancelled concurrently between the fetch and the update.
            return Err(AppointmentError::NotFound);
        }

        let cancelled: Appointment = serde_json::from_value(updated[0].clone())
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointment: {}", e)))?;

        // Release unconditionally; the slot becomes bookable again.
        self.slots
            .release_slot(appointment.slot_id)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!(
            "Appointment {} cancelled, slot {} released",
            cancelled.id, appointment.slot_id
        );
        Ok(cancelled)
    }

    // Private helper methods

    async fn fetch_appointments(
        &self,
        path: &str,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let appointments: Vec<AppointmentWithDetails> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AppointmentWithDetails>, _>>()
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointments: {}", e)))?;

        Ok(appointments)
    }
}
