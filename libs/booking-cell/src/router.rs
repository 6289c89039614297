use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{self, BookingState};

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/packages", get(handlers::list_packages))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route("/sessions/{session_id}", delete(handlers::delete_session))
        .route("/sessions/{session_id}/date-time", put(handlers::set_date_time))
        .route("/sessions/{session_id}/package", put(handlers::set_package))
        .route("/sessions/{session_id}/patient", put(handlers::set_patient_details))
        .route(
            "/sessions/{session_id}/payment-method",
            put(handlers::set_payment_method),
        )
        .route("/sessions/{session_id}/cards", post(handlers::add_card))
        .route("/sessions/{session_id}/cards/{card_id}", put(handlers::update_card))
        .route(
            "/sessions/{session_id}/cards/{card_id}/select",
            post(handlers::select_card),
        )
        .route("/sessions/{session_id}/confirm", post(handlers::confirm))
        .with_state(state)
}
