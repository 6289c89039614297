use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/favorites/{user_id}", get(handlers::list_favorites))
        .route("/favorites/{user_id}/{doctor_id}", post(handlers::add_favorite))
        .route("/favorites/{user_id}/{doctor_id}", delete(handlers::remove_favorite))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .with_state(state)
}
