use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn review_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::submit_review))
        .route("/doctor/{doctor_id}", get(handlers::list_doctor_reviews))
        .with_state(state)
}
