// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, require_role};

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Booking and the student's own listing
    let student_routes = Router::new()
        .route("/{id}", post(handlers::book_appointment))
        .route("/me", get(handlers::my_appointments))
        .layer(middleware::from_fn_with_state(Role::Student, require_role));

    // Cancellation is professor-initiated only
    let professor_routes = Router::new()
        .route("/professor/me", get(handlers::professor_appointments))
        .route("/{id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(Role::Professor, require_role));

    Router::new()
        .merge(student_routes)
        .merge(professor_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
