// libs/availability-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, require_role};

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    // Slot management, owner side
    let professor_routes = Router::new()
        .route("/", post(handlers::create_slot))
        .route("/me", get(handlers::my_slots))
        .route("/{id}", put(handlers::update_slot))
        .route("/{id}", delete(handlers::delete_slot))
        .layer(middleware::from_fn_with_state(Role::Professor, require_role));

    // Browsing a professor's open slots, student side
    let student_routes = Router::new()
        .route("/professors/{professor_id}", get(handlers::open_slots))
        .layer(middleware::from_fn_with_state(Role::Student, require_role));

    Router::new()
        .merge(professor_routes)
        .merge(student_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
