pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    decode_appointments, AppointmentBuckets, AppointmentStatus, EnrichedAppointment,
    PatientRecord, RawAppointment,
};
pub use services::enricher::{enrich, group_by_status};
pub use services::feed::{AppointmentFeed, CallWindowTicker};
pub use services::schedule::{evaluate_call_window, is_within_call_window, CallWindow};
