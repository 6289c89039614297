use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use doctor_cell::models::{decode_doctors, Doctor};
use shared_database::SnapshotSource;

use crate::models::{decode_appointments, AppointmentStatus, EnrichedAppointment, RawAppointment};
use crate::services::enricher::enrich;
use crate::services::schedule::{evaluate_call_window, DEFAULT_CALL_DURATION_MINUTES};

/// How often call windows are re-evaluated while a consumer is attached.
pub const CALL_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Live enriched-appointment stream for one user.
///
/// Subscribes to the user's appointment collection and the doctor directory;
/// whichever side changes, the whole enriched list is recomputed and
/// published. Until both sources have delivered a snapshot the list is
/// simply smaller (or empty); partial data is expected, not an error.
/// Dropping the feed aborts the aggregation task and both subscriptions.
pub struct AppointmentFeed {
    rx: watch::Receiver<Vec<EnrichedAppointment>>,
    task: JoinHandle<()>,
}

impl AppointmentFeed {
    pub fn spawn(source: Arc<dyn SnapshotSource>, user_id: &str) -> Self {
        let mut appointments = source.watch(&format!("appointments/{}", user_id));
        let mut doctors = source.watch("doctors");
        let user_id = user_id.to_string();
        let (tx, rx) = watch::channel(Vec::new());

        let task = tokio::spawn(async move {
            let mut raw: Vec<(String, RawAppointment)> = Vec::new();
            let mut directory: Vec<Doctor> = Vec::new();

            loop {
                tokio::select! {
                    snapshot = appointments.recv() => match snapshot {
                        Some(value) => raw = decode_appointments(&value),
                        None => break,
                    },
                    snapshot = doctors.recv() => match snapshot {
                        Some(value) => directory = decode_doctors(&value),
                        None => break,
                    },
                }

                let today = Local::now().date_naive();
                let enriched = enrich(&raw, &directory, today);
                debug!(
                    "Recomputed {} enriched appointments for {}",
                    enriched.len(),
                    user_id
                );
                if tx.send(enriched).is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<EnrichedAppointment>> {
        self.rx.clone()
    }
}

impl Drop for AppointmentFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Per-appointment call availability at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusEntry {
    pub appointment_id: String,
    pub time: String,
    pub in_window: bool,
    pub label: String,
}

/// Evaluate call windows for every upcoming appointment in a snapshot.
pub fn call_statuses(
    appointments: &[EnrichedAppointment],
    now: chrono::NaiveDateTime,
) -> Vec<CallStatusEntry> {
    appointments
        .iter()
        .filter(|appointment| appointment.status == AppointmentStatus::Upcoming)
        .map(|appointment| {
            let window =
                evaluate_call_window(&appointment.start_time, DEFAULT_CALL_DURATION_MINUTES, now);
            CallStatusEntry {
                appointment_id: appointment.id.clone(),
                time: appointment.start_time.clone(),
                in_window: window.is_open(),
                label: window.to_string(),
            }
        })
        .collect()
}

/// Periodic call-window re-evaluation over a feed's snapshots.
///
/// Wall-clock time advances without any upstream event, so availability is
/// recomputed on a fixed tick as well as on every feed change. The task is
/// aborted when the ticker drops; a dismissed consumer leaves no timer
/// running behind it.
pub struct CallWindowTicker {
    rx: watch::Receiver<Vec<CallStatusEntry>>,
    task: JoinHandle<()>,
}

impl CallWindowTicker {
    pub fn spawn(
        mut feed: watch::Receiver<Vec<EnrichedAppointment>>,
        period: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = feed.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let snapshot = feed.borrow_and_update().clone();
                let statuses = call_statuses(&snapshot, Local::now().naive_local());
                if tx.send(statuses).is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CallStatusEntry>> {
        self.rx.clone()
    }
}

impl Drop for CallWindowTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
