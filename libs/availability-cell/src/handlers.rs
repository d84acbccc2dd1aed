// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateSlotRequest, SlotError, UpdateSlotRequest};
use crate::services::SlotService;

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

fn slot_error(err: SlotError) -> AppError {
    match err {
        SlotError::InvalidRange | SlotError::SlotLocked | SlotError::ClaimFailed => {
            AppError::BadRequest(err.to_string())
        }
        SlotError::DuplicateSlot => AppError::Conflict(err.to_string()),
        SlotError::NotFound => AppError::NotFound(err.to_string()),
        SlotError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let professor_id = caller_id(&user)?;

    let service = SlotService::new(&state);
    let slot = service
        .create_slot(professor_id, request)
        .await
        .map_err(slot_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": slot
        })),
    ))
}

/// The owning professor's full calendar, booked slots included.
#[axum::debug_handler]
pub async fn my_slots(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let professor_id = caller_id(&user)?;

    let service = SlotService::new(&state);
    let slots = service
        .list_professor_slots(professor_id)
        .await
        .map_err(slot_error)?;

    Ok(Json(json!({
        "success": true,
        "data": slots
    })))
}

/// Open slots of one professor, as seen by students.
#[axum::debug_handler]
pub async fn open_slots(
    State(state): State<Arc<AppConfig>>,
    Path(professor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = SlotService::new(&state);
    let slots = service
        .list_open_slots(professor_id)
        .await
        .map_err(slot_error)?;

    Ok(Json(json!({
        "success": true,
        "data": slots
    })))
}

#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let professor_id = caller_id(&user)?;

    let service = SlotService::new(&state);
    let slot = service
        .update_slot(professor_id, id, request)
        .await
        .map_err(slot_error)?;

    Ok(Json(json!({
        "success": true,
        "data": slot
    })))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let professor_id = caller_id(&user)?;

    let service = SlotService::new(&state);
    service
        .delete_slot(professor_id, id)
        .await
        .map_err(slot_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Slot deleted successfully"
    })))
}
