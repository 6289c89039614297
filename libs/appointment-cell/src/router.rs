use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/call-status", get(handlers::call_status))
        .route("/{user_id}", get(handlers::list_appointments))
        .route("/{user_id}/stream", get(handlers::stream_appointments))
        .route(
            "/{user_id}/{appointment_id}/cancel",
            post(handlers::cancel_appointment),
        )
        .with_state(state)
}
