use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde_json::json;
use tokio::sync::watch;
use tokio::time::timeout;

use appointment_cell::models::{AppointmentStatus, EnrichedAppointment};
use appointment_cell::services::feed::{call_statuses, CallWindowTicker};
use appointment_cell::AppointmentFeed;
use shared_database::MemorySource;

const WAIT: Duration = Duration::from_secs(2);

/// Wait until the feed publishes a snapshot satisfying `pred`, starting from
/// whatever value is already current.
async fn wait_for<F>(
    rx: &mut watch::Receiver<Vec<EnrichedAppointment>>,
    pred: F,
) -> Vec<EnrichedAppointment>
where
    F: Fn(&[EnrichedAppointment]) -> bool,
{
    timeout(WAIT, async {
        loop {
            let current = rx.borrow_and_update().clone();
            if pred(&current) {
                return current;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("feed did not publish the expected snapshot in time")
}

fn doctor_node(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "speciality": "Immunologists",
        "hospital": "Christ Hospital",
        "location": "London, UK",
        "imageUrl": "https://img.example/d1.png"
    })
}

fn appointment_node(doctor_id: &str) -> serde_json::Value {
    json!({
        "patientDetails": {
            "fullName": "Andrew Ainsley Johnson",
            "gender": "Male",
            "age": 27,
            "problem": "Recurring migraines since February"
        },
        "doctorId": doctor_id,
        "date": "2025-03-05",
        "time": "2:00 PM",
        "package": "Voice Call",
        "price": 40,
        "status": "Confirmed"
    })
}

#[tokio::test]
async fn feed_tolerates_appointments_arriving_before_doctors() {
    let source = Arc::new(MemorySource::new());
    let feed = AppointmentFeed::spawn(source.clone(), "u1");
    let mut rx = feed.subscribe();

    // Appointments land first; the join has nothing to resolve against, so
    // the published list stays empty rather than leaking partial records.
    source.set("appointments/u1", json!({"-Na1": appointment_node("d1")}));
    timeout(WAIT, rx.changed()).await.unwrap().unwrap();
    assert!(rx.borrow_and_update().is_empty());

    // Directory catches up; the same appointment now resolves.
    source.set("doctors", json!({"d1": doctor_node("Dr. Jenny Watson")}));
    let snapshot = wait_for(&mut rx, |list| !list.is_empty()).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].doctor_name, "Dr. Jenny Watson");
}

#[tokio::test]
async fn doctor_change_recomputes_the_whole_list() {
    let source = Arc::new(MemorySource::new());
    source.set("doctors", json!({"d1": doctor_node("Dr. Jenny Watson")}));
    source.set("appointments/u1", json!({"-Na1": appointment_node("d1")}));

    let feed = AppointmentFeed::spawn(source.clone(), "u1");
    let mut rx = feed.subscribe();

    let snapshot = wait_for(&mut rx, |list| !list.is_empty()).await;
    assert_eq!(snapshot[0].doctor_name, "Dr. Jenny Watson");

    // A doctor-side change alone must refresh the enriched record: no stale
    // doctor fields paired with fresh appointment fields.
    source.set("doctors", json!({"d1": doctor_node("Dr. Jenny Watson-Reed")}));
    let snapshot = wait_for(&mut rx, |list| {
        list.first()
            .is_some_and(|record| record.doctor_name == "Dr. Jenny Watson-Reed")
    })
    .await;
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn removing_a_doctor_drops_their_appointments() {
    let source = Arc::new(MemorySource::new());
    source.set("doctors", json!({"d1": doctor_node("Dr. Jenny Watson")}));
    source.set("appointments/u1", json!({"-Na1": appointment_node("d1")}));

    let feed = AppointmentFeed::spawn(source.clone(), "u1");
    let mut rx = feed.subscribe();

    let snapshot = wait_for(&mut rx, |list| !list.is_empty()).await;
    assert_eq!(snapshot.len(), 1);

    source.set("doctors", json!({}));
    wait_for(&mut rx, |list| list.is_empty()).await;
}

fn upcoming_at(start_time: &str) -> EnrichedAppointment {
    EnrichedAppointment {
        id: "-Na1".to_string(),
        doctor_id: "d1".to_string(),
        doctor_name: "Dr. Jenny Watson".to_string(),
        doctor_speciality: "Immunologists".to_string(),
        doctor_location: "Christ Hospital in London, UK".to_string(),
        doctor_photo_url: String::new(),
        patient_name: "Andrew Ainsley Johnson".to_string(),
        patient_gender: "Male".to_string(),
        patient_age: 27,
        problem: "Recurring migraines since February".to_string(),
        date_label: "Today, March 05, 2025".to_string(),
        time_range: "02:00 PM – 02:30 PM".to_string(),
        start_time: start_time.to_string(),
        duration_label: "30 minutes".to_string(),
        package_type: "Voice Call".to_string(),
        package_price: "$40".to_string(),
        status: AppointmentStatus::Upcoming,
    }
}

#[test]
fn call_statuses_skip_non_upcoming_appointments() {
    let now = chrono::NaiveDate::from_ymd_opt(2025, 3, 5)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap();

    let mut completed = upcoming_at("2:00 PM");
    completed.status = AppointmentStatus::Completed;

    let statuses = call_statuses(&[upcoming_at("2:00 PM"), completed], now);
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].in_window);
    assert_eq!(statuses[0].label, "Call now");
}

#[tokio::test]
async fn ticker_emits_statuses_for_current_snapshot() {
    let start_time = Local::now().format("%I:%M %p").to_string();
    let (tx, rx) = watch::channel(vec![upcoming_at(&start_time)]);

    let ticker = CallWindowTicker::spawn(rx, Duration::from_millis(50));
    let mut statuses = ticker.subscribe();

    let current = timeout(WAIT, async {
        loop {
            let current = statuses.borrow_and_update().clone();
            if !current.is_empty() {
                return current;
            }
            statuses.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    assert_eq!(current.len(), 1);
    assert!(current[0].in_window, "a call starting now must be in window");

    drop(tx);
}

#[tokio::test]
async fn dropping_the_ticker_stops_its_task() {
    let (_tx, rx) = watch::channel(Vec::new());
    let ticker = CallWindowTicker::spawn(rx, Duration::from_millis(50));
    let mut statuses = ticker.subscribe();

    drop(ticker);

    // The aborted task drops its sender; the stream ends instead of ticking on.
    let ended = timeout(WAIT, async {
        while statuses.changed().await.is_ok() {}
    })
    .await;
    assert!(ended.is_ok(), "ticker task kept running after drop");
}
