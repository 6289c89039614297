use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    patient_details_valid, BookingError, BookingSnapshot, CreditCard, PAYMENT_METHOD_CARD,
};
use crate::services::cardform::CardForm;
use crate::services::checkout::CheckoutService;
use crate::services::pricing::{
    find_package, package_catalog, price_for_duration, DEFAULT_DURATION_MINUTES, OFFERED_DURATIONS,
};
use crate::services::session::BookingSession;

/// Booking sessions are in-process wizard state, not store documents; the
/// registry owns them for their whole lifetime.
pub struct BookingState {
    pub config: AppConfig,
    sessions: RwLock<HashMap<Uuid, BookingSession>>,
}

impl BookingState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

fn booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::SessionNotFound | BookingError::CardNotFound => {
            AppError::NotFound(err.to_string())
        }
        BookingError::UnknownPackage(_) => AppError::BadRequest(err.to_string()),
        BookingError::IncompleteStep(_) | BookingError::ValidationError(_) => {
            AppError::ValidationError(err.to_string())
        }
        BookingError::DatabaseError(message) => AppError::Database(message),
    }
}

async fn with_session<T>(
    state: &BookingState,
    session_id: Uuid,
    apply: impl FnOnce(&BookingSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| booking_error(BookingError::SessionNotFound))?;
    apply(session)
}

fn gates(snapshot: &BookingSnapshot) -> Value {
    json!({
        "dateTime": snapshot.date_time_selected(),
        "package": snapshot.package_selected(),
        "patientDetails": snapshot.patient_details_complete(),
        "payment": snapshot.payment_selected(),
        "readyToConfirm": snapshot.ready_to_confirm()
    })
}

fn session_body(session_id: Uuid, snapshot: &BookingSnapshot) -> Json<Value> {
    Json(json!({
        "success": true,
        "sessionId": session_id,
        "session": snapshot,
        "gates": gates(snapshot)
    }))
}

// ==============================================================================
// REQUEST BODIES
// ==============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DateTimeRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    pub package_id: String,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetailsRequest {
    pub full_name: String,
    pub gender: String,
    pub age: String,
    pub problem: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodRequest {
    pub method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub holder_name: String,
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub user_id: String,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_packages() -> Json<Value> {
    Json(json!({
        "success": true,
        "packages": package_catalog(),
        "durations": OFFERED_DURATIONS
    }))
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let session = BookingSession::new(&request.doctor_id);
    let snapshot = session.snapshot();
    let session_id = Uuid::new_v4();

    state.sessions.write().await.insert(session_id, session);
    Ok(session_body(session_id, &snapshot))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let removed = state.sessions.write().await.remove(&session_id);
    if removed.is_none() {
        return Err(booking_error(BookingError::SessionNotFound));
    }
    Ok(Json(json!({"success": true})))
}

#[axum::debug_handler]
pub async fn set_date_time(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<DateTimeRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        session.set_date_time(&request.date, &request.time);
        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

/// Package step. Reachable only once a date and time are picked; the price
/// is derived here from the catalog base price and the chosen duration.
#[axum::debug_handler]
pub async fn set_package(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PackageRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        if !session.snapshot().date_time_selected() {
            return Err(booking_error(BookingError::IncompleteStep(
                "date and time".to_string(),
            )));
        }

        let package = find_package(&request.package_id)
            .ok_or_else(|| booking_error(BookingError::UnknownPackage(request.package_id.clone())))?;

        let duration = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        let price = price_for_duration(package.base_price, duration);
        session.set_package(&package.name, duration, price);

        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

/// Patient step. Invalid details never reach the snapshot; the wizard's
/// Next button is a hard gate, not advice.
#[axum::debug_handler]
pub async fn set_patient_details(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PatientDetailsRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        if !session.snapshot().package_selected() {
            return Err(booking_error(BookingError::IncompleteStep(
                "package".to_string(),
            )));
        }

        if !patient_details_valid(
            &request.full_name,
            &request.gender,
            &request.age,
            &request.problem,
        ) {
            return Err(booking_error(BookingError::ValidationError(
                "Patient details incomplete".to_string(),
            )));
        }

        session.set_patient_details(
            &request.full_name,
            &request.gender,
            &request.age,
            &request.problem,
        );
        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn set_payment_method(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PaymentMethodRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        if !session.snapshot().patient_details_complete() {
            return Err(booking_error(BookingError::IncompleteStep(
                "patient details".to_string(),
            )));
        }

        // "Card" is the sentinel written by card selection; picking it
        // directly would claim a card payment with no card attached.
        if request.method == PAYMENT_METHOD_CARD {
            return Err(booking_error(BookingError::ValidationError(
                "Select a saved card instead of the Card method".to_string(),
            )));
        }

        session.set_payment_method(&request.method);
        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn add_card(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CardRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        if !session.snapshot().patient_details_complete() {
            return Err(booking_error(BookingError::IncompleteStep(
                "patient details".to_string(),
            )));
        }

        let form = CardForm {
            holder_name: request.holder_name.clone(),
            number: request.number.clone(),
            expiry: request.expiry.clone(),
            cvv: request.cvv.clone(),
        };
        if !form.is_valid() {
            return Err(booking_error(BookingError::ValidationError(
                "Card form incomplete".to_string(),
            )));
        }

        let card = CreditCard {
            id: Uuid::new_v4(),
            holder_name: request.holder_name,
            number: request.number,
            expiry: request.expiry,
            cvv: request.cvv,
            network: "Mastercard".to_string(),
        };
        session.add_card(card);

        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn update_card(
    State(state): State<Arc<BookingState>>,
    Path((session_id, card_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CardRequest>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        if session.snapshot().card(card_id).is_none() {
            return Err(booking_error(BookingError::CardNotFound));
        }

        let form = CardForm {
            holder_name: request.holder_name.clone(),
            number: request.number.clone(),
            expiry: request.expiry.clone(),
            cvv: request.cvv.clone(),
        };
        if !form.is_valid() {
            return Err(booking_error(BookingError::ValidationError(
                "Card form incomplete".to_string(),
            )));
        }

        session.update_card(CreditCard {
            id: card_id,
            holder_name: request.holder_name,
            number: request.number,
            expiry: request.expiry,
            cvv: request.cvv,
            network: "Mastercard".to_string(),
        });

        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn select_card(
    State(state): State<Arc<BookingState>>,
    Path((session_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    with_session(&state, session_id, |session| {
        session.select_card(card_id).map_err(booking_error)?;
        Ok(session_body(session_id, &session.snapshot()))
    })
    .await
}

#[axum::debug_handler]
pub async fn confirm(
    State(state): State<Arc<BookingState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth
        .as_ref()
        .map(|header| header.token().to_string())
        .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?;

    let snapshot = with_session(&state, session_id, |session| Ok(session.snapshot())).await?;

    let checkout = CheckoutService::new(&state.config);
    let appointment_key = checkout
        .confirm(&request.user_id, &snapshot, Some(&token))
        .await
        .map_err(booking_error)?;

    // The wizard is done; the session has served its purpose.
    state.sessions.write().await.remove(&session_id);

    Ok(Json(json!({
        "success": true,
        "appointmentKey": appointment_key
    })))
}
