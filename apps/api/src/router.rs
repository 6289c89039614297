use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use booking_cell::handlers::BookingState;
use booking_cell::router::booking_routes;
use doctor_cell::router::doctor_routes;
use review_cell::router::review_routes;
use shared_config::AppConfig;
use shared_database::RealtimeClient;
use shared_models::error::AppError;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let booking_state = Arc::new(BookingState::new((*state).clone()));

    Router::new()
        .route("/", get(|| async { "Onmed API is running!" }))
        .route("/content/welcome", get(welcome_content).with_state(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/reviews", review_routes(state))
        .nest("/booking", booking_routes(booking_state))
}

/// Onboarding copy, a one-shot read of the `welcome` node.
async fn welcome_content(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let client = RealtimeClient::new(&state);
    let content: Value = client
        .get("welcome", None)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "welcome": content
    })))
}
