use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

// ==============================================================================
// STORED APPOINTMENT MODELS
// ==============================================================================

/// Patient sub-record embedded in every appointment document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub problem: String,
}

/// An appointment document as stored under `appointments/{uid}/{pushKey}`.
/// The push key is the appointment id and is carried alongside, not inside,
/// the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppointment {
    pub patient_details: PatientRecord,
    pub doctor_id: String,
    /// Calendar date, ISO `yyyy-mm-dd`.
    pub date: String,
    /// Wall-clock start, 12-hour format, e.g. "2:00 PM".
    pub time: String,
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default = "default_price")]
    pub price: i64,
    /// Backend vocabulary: Confirmed / Completed / Cancelled. Absent on some
    /// legacy documents, which read as confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn default_package() -> String {
    "Messaging".to_string()
}

fn default_price() -> i64 {
    20
}

/// Decode an `appointments/{uid}` snapshot into (push key, document) pairs.
/// Undecodable children are skipped with a warning.
pub fn decode_appointments(snapshot: &Value) -> Vec<(String, RawAppointment)> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(
            |(key, node)| match serde_json::from_value::<RawAppointment>(node.clone()) {
                Ok(raw) => Some((key.clone(), raw)),
                Err(err) => {
                    warn!("Skipping undecodable appointment {}: {}", key, err);
                    None
                }
            },
        )
        .collect()
}

// ==============================================================================
// STATUS
// ==============================================================================

/// Normalized appointment status. The backend vocabulary is open-ended;
/// unknown strings ride along in `Other` instead of failing the decode, and
/// land in none of the three UI buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn from_backend(raw: &str) -> Self {
        match raw {
            "Confirmed" => AppointmentStatus::Upcoming,
            "Completed" => AppointmentStatus::Completed,
            "Cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }

    /// Completed and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Gate for the cancel transition: only non-terminal appointments may
    /// move to Cancelled.
    pub fn ensure_cancellable(&self) -> Result<(), AppointmentError> {
        if self.is_terminal() {
            return Err(AppointmentError::InvalidStatusTransition(self.clone()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Upcoming => "UPCOMING",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ==============================================================================
// ENRICHED VIEW MODELS
// ==============================================================================

/// An appointment joined with its doctor's display fields, ready for the
/// client. Recomputed wholesale on every upstream change; never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAppointment {
    pub id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub doctor_speciality: String,
    pub doctor_location: String,
    pub doctor_photo_url: String,
    pub patient_name: String,
    pub patient_gender: String,
    pub patient_age: u32,
    pub problem: String,
    /// Display-ready label, e.g. "Today, March 05, 2025".
    pub date_label: String,
    /// Display range, e.g. "02:00 PM – 02:30 PM".
    pub time_range: String,
    /// Raw wall-clock start, kept for call-window evaluation.
    pub start_time: String,
    pub duration_label: String,
    pub package_type: String,
    pub package_price: String,
    pub status: AppointmentStatus,
}

/// The three status tabs. Unknown statuses appear in none of them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBuckets {
    pub upcoming: Vec<EnrichedAppointment>,
    pub completed: Vec<EnrichedAppointment>,
    pub cancelled: Vec<EnrichedAppointment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum AppointmentError {
    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),
}
