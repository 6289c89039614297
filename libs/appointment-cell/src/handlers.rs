use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Local;
use futures::stream::{self, Stream};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use doctor_cell::models::decode_doctors;
use shared_config::AppConfig;
use shared_database::{RealtimeClient, SnapshotSource};
use shared_models::error::AppError;

use crate::models::{decode_appointments, AppointmentStatus, RawAppointment};
use crate::services::enricher::{enrich, group_by_status};
use crate::services::feed::{AppointmentFeed, CallWindowTicker, CALL_TICK_PERIOD};
use crate::services::schedule::{evaluate_call_window, DEFAULT_CALL_DURATION_MINUTES};

#[derive(Debug, Deserialize)]
pub struct CallStatusQuery {
    pub time: String,
    pub duration: Option<i64>,
}

fn bearer(auth: &Option<TypedHeader<Authorization<Bearer>>>) -> Option<&str> {
    auth.as_ref().map(|header| header.token())
}

/// One-shot read of a user's appointment list, enriched and grouped.
///
/// A backend failure degrades to an empty list with an error flag; the
/// client renders an empty state instead of a hard failure.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    let client = RealtimeClient::new(&state);
    let token = bearer(&auth);

    let appointments_path = format!("appointments/{}", user_id);
    let raw = match client.get::<Value>(&appointments_path, token).await {
        Ok(snapshot) => decode_appointments(&snapshot),
        Err(err) => {
            warn!("Appointment read failed for {}: {}", user_id, err);
            return Json(json!({
                "success": false,
                "error": err.to_string(),
                "appointments": [],
                "buckets": { "upcoming": [], "completed": [], "cancelled": [] }
            }));
        }
    };

    let directory = match client.get::<Value>("doctors", token).await {
        Ok(snapshot) => decode_doctors(&snapshot),
        Err(err) => {
            warn!("Doctor directory read failed: {}", err);
            return Json(json!({
                "success": false,
                "error": err.to_string(),
                "appointments": [],
                "buckets": { "upcoming": [], "completed": [], "cancelled": [] }
            }));
        }
    };

    let enriched = enrich(&raw, &directory, Local::now().date_naive());
    let buckets = group_by_status(&enriched);

    Json(json!({
        "success": true,
        "appointments": enriched,
        "buckets": buckets
    }))
}

/// Evaluate call availability for a wall-clock start time right now.
#[axum::debug_handler]
pub async fn call_status(Query(query): Query<CallStatusQuery>) -> Json<Value> {
    let duration = query.duration.unwrap_or(DEFAULT_CALL_DURATION_MINUTES);
    let window = evaluate_call_window(&query.time, duration, Local::now().naive_local());

    Json(json!({
        "time": query.time,
        "duration": duration,
        "inWindow": window.is_open(),
        "status": window.to_string()
    }))
}

/// Cancel an upcoming appointment. Completed and cancelled appointments are
/// terminal; the transition is rejected with a conflict.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path((user_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let token = bearer(&auth).ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?;
    let client = RealtimeClient::new(&state);

    let path = format!("appointments/{}/{}", user_id, appointment_id);
    let snapshot: Value = client
        .get(&path, Some(token))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if snapshot.is_null() {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }

    let appointment: RawAppointment = serde_json::from_value(snapshot)
        .map_err(|e| AppError::Internal(format!("Undecodable appointment document: {e}")))?;

    let status =
        AppointmentStatus::from_backend(appointment.status.as_deref().unwrap_or("Confirmed"));
    status
        .ensure_cancellable()
        .map_err(|e| AppError::Conflict(e.to_string()))?;

    client
        .patch(&path, Some(token), json!({"status": "Cancelled"}))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "appointmentId": appointment_id,
        "status": "CANCELLED"
    })))
}

/// Live appointment stream: `appointments` events whenever either backing
/// collection changes, `call-status` events on feed changes and once per
/// minute. Disconnecting tears down the feed, the ticker and both store
/// subscriptions.
pub async fn stream_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let source: Arc<dyn SnapshotSource> = Arc::new(RealtimeClient::new(&state));
    let feed = AppointmentFeed::spawn(source, &user_id);
    let ticker = CallWindowTicker::spawn(feed.subscribe(), CALL_TICK_PERIOD);

    let appointment_events = stream::unfold((feed.subscribe(), feed), |(mut rx, feed)| async move {
        rx.changed().await.ok()?;
        let payload = serde_json::to_string(&*rx.borrow_and_update()).ok()?;
        Some((
            Ok(Event::default().event("appointments").data(payload)),
            (rx, feed),
        ))
    });

    let status_events = stream::unfold((ticker.subscribe(), ticker), |(mut rx, ticker)| async move {
        rx.changed().await.ok()?;
        let payload = serde_json::to_string(&*rx.borrow_and_update()).ok()?;
        Some((
            Ok(Event::default().event("call-status").data(payload)),
            (rx, ticker),
        ))
    });

    Sse::new(stream::select(appointment_events, status_events)).keep_alive(KeepAlive::default())
}
