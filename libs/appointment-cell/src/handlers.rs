// libs/appointment-cell/src/handlers.rs
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

use crate::models::AppointmentError;
use crate::services::BookingService;

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

fn appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::SlotUnavailable => AppError::BadRequest(err.to_string()),
        AppointmentError::NotFound => AppError::NotFound(err.to_string()),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let student_id = caller_id(&user)?;

    let service = BookingService::new(&state);
    let appointment = service
        .book_appointment(student_id, id)
        .await
        .map_err(appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let student_id = caller_id(&user)?;

    let service = BookingService::new(&state);
    let appointments = service
        .student_appointments(student_id)
        .await
        .map_err(appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": appointments
    })))
}

#[axum::debug_handler]
pub async fn professor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let professor_id = caller_id(&user)?;

    let service = BookingService::new(&state);
    let appointments = service
        .professor_appointments(professor_id)
        .await
        .map_err(appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": appointments
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let professor_id = caller_id(&user)?;

    let service = BookingService::new(&state);
    let appointment = service
        .cancel_appointment(professor_id, id)
        .await
        .map_err(appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}
