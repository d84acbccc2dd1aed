// libs/auth-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AuthError, LoginRequest, RegisterRequest};
use crate::services::AccountService;

fn auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::EmailTaken | AuthError::InvalidCredentials => AppError::BadRequest(err.to_string()),
        AuthError::Hash(msg) | AuthError::Token(msg) => AppError::Internal(msg),
        AuthError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AccountService::new(&state);
    let response = service.register(request).await.map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": response
        })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&state);
    let response = service.login(request).await.map_err(auth_error)?;

    Ok(Json(json!({
        "success": true,
        "data": response
    })))
}

/// Sessions are stateless; logout is acknowledged and the client discards
/// its token.
#[axum::debug_handler]
pub async fn logout() -> Json<Value> {
    debug!("Logout acknowledged");

    Json(json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}
