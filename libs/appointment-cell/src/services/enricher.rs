use chrono::NaiveDate;
use tracing::{debug, warn};

use doctor_cell::models::Doctor;

use crate::models::{AppointmentBuckets, AppointmentStatus, EnrichedAppointment, RawAppointment};
use crate::services::display::{date_label, parse_iso_date, time_range_label};
use crate::services::schedule::parse_clock_time;

/// Join raw appointment documents with the doctor directory into
/// display-ready records.
///
/// This is a full recompute: callers invoke it with the complete current
/// state of both collections whenever either changes. Records are dropped,
/// never emitted partially, when
///   - the doctor id resolves to no doctor (not yet synced), or
///   - the date or time string fails to parse.
/// Either collection may be empty while the other source is still catching
/// up; the result is simply smaller.
pub fn enrich(
    raw: &[(String, RawAppointment)],
    doctors: &[Doctor],
    today: NaiveDate,
) -> Vec<EnrichedAppointment> {
    raw.iter()
        .filter_map(|(key, appointment)| {
            let Some(doctor) = doctors.iter().find(|d| d.id == appointment.doctor_id) else {
                debug!(
                    "Dropping appointment {}: doctor {} not in directory",
                    key, appointment.doctor_id
                );
                return None;
            };

            let Some(start) = parse_clock_time(&appointment.time) else {
                warn!(
                    "Dropping appointment {}: unparsable time {:?}",
                    key, appointment.time
                );
                return None;
            };

            let Some(date) = parse_iso_date(&appointment.date) else {
                warn!(
                    "Dropping appointment {}: unparsable date {:?}",
                    key, appointment.date
                );
                return None;
            };

            let status = AppointmentStatus::from_backend(
                appointment.status.as_deref().unwrap_or("Confirmed"),
            );

            Some(EnrichedAppointment {
                id: key.clone(),
                doctor_id: appointment.doctor_id.clone(),
                doctor_name: doctor.name.clone(),
                doctor_speciality: doctor.speciality.clone(),
                doctor_location: doctor.display_location(),
                doctor_photo_url: doctor.image_url.clone(),
                patient_name: appointment.patient_details.full_name.clone(),
                patient_gender: appointment.patient_details.gender.clone(),
                patient_age: appointment.patient_details.age,
                problem: appointment.patient_details.problem.clone(),
                date_label: date_label(date, today),
                time_range: time_range_label(start),
                start_time: appointment.time.clone(),
                duration_label: "30 minutes".to_string(),
                package_type: appointment.package.clone(),
                package_price: format!("${}", appointment.price),
                status,
            })
        })
        .collect()
}

/// Split an enriched list into the three status tabs. Records with an
/// unrecognized status land in none of them.
pub fn group_by_status(appointments: &[EnrichedAppointment]) -> AppointmentBuckets {
    let mut buckets = AppointmentBuckets::default();

    for appointment in appointments {
        match appointment.status {
            AppointmentStatus::Upcoming => buckets.upcoming.push(appointment.clone()),
            AppointmentStatus::Completed => buckets.completed.push(appointment.clone()),
            AppointmentStatus::Cancelled => buckets.cancelled.push(appointment.clone()),
            AppointmentStatus::Other(_) => {}
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientRecord;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn doctor(id: &str, name: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: name.to_string(),
            speciality: "Immunologists".to_string(),
            hospital: "Christ Hospital".to_string(),
            location: "London, UK".to_string(),
            image_url: format!("https://img.example/{id}.png"),
            rating: 4.8,
            reviews: 942,
        }
    }

    fn appointment(doctor_id: &str, date: &str, time: &str, status: Option<&str>) -> RawAppointment {
        RawAppointment {
            patient_details: PatientRecord {
                full_name: "Andrew Ainsley Johnson".to_string(),
                gender: "Male".to_string(),
                age: 27,
                problem: "Recurring migraines since February".to_string(),
            },
            doctor_id: doctor_id.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            package: "Voice Call".to_string(),
            price: 40,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn enriches_with_doctor_display_fields() {
        let raw = vec![(
            "-Na1".to_string(),
            appointment("d1", "2025-03-05", "2:00 PM", Some("Confirmed")),
        )];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        let enriched = enrich(&raw, &doctors, today());
        assert_eq!(enriched.len(), 1);

        let record = &enriched[0];
        assert_eq!(record.id, "-Na1");
        assert_eq!(record.doctor_name, "Dr. Jenny Watson");
        assert_eq!(record.doctor_location, "Christ Hospital in London, UK");
        assert_eq!(record.date_label, "Today, March 05, 2025");
        assert_eq!(record.time_range, "02:00 PM – 02:30 PM");
        assert_eq!(record.package_price, "$40");
        assert_eq!(record.status, AppointmentStatus::Upcoming);
    }

    #[test]
    fn unresolved_doctor_drops_the_record() {
        let raw = vec![
            (
                "-Na1".to_string(),
                appointment("d1", "2025-03-05", "2:00 PM", Some("Confirmed")),
            ),
            (
                "-Na2".to_string(),
                appointment("ghost", "2025-03-06", "3:00 PM", Some("Confirmed")),
            ),
        ];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        let enriched = enrich(&raw, &doctors, today());
        assert_eq!(enriched.len(), 1);
        assert!(enriched.iter().all(|record| record.doctor_id == "d1"));
    }

    #[test]
    fn unparsable_time_or_date_drops_the_record() {
        let raw = vec![
            (
                "-Na1".to_string(),
                appointment("d1", "2025-03-05", "25:99 XM", Some("Confirmed")),
            ),
            (
                "-Na2".to_string(),
                appointment("d1", "not-a-date", "2:00 PM", Some("Confirmed")),
            ),
        ];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        assert!(enrich(&raw, &doctors, today()).is_empty());
    }

    #[test]
    fn empty_counterpart_collection_yields_empty_result() {
        let raw = vec![(
            "-Na1".to_string(),
            appointment("d1", "2025-03-05", "2:00 PM", None),
        )];

        assert!(enrich(&raw, &[], today()).is_empty());
        assert!(enrich(&[], &[doctor("d1", "Dr. Jenny Watson")], today()).is_empty());
    }

    #[test]
    fn missing_status_reads_as_upcoming() {
        let raw = vec![(
            "-Na1".to_string(),
            appointment("d1", "2025-03-07", "2:00 PM", None),
        )];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        let enriched = enrich(&raw, &doctors, today());
        assert_eq!(enriched[0].status, AppointmentStatus::Upcoming);
    }

    #[test]
    fn display_range_stays_thirty_minutes_for_longer_packages() {
        // A 60-minute Video Call still renders a 30-minute range; the stored
        // document carries no duration and the card never derives one.
        let mut long_session = appointment("d1", "2025-03-05", "4:00 PM", Some("Confirmed"));
        long_session.package = "Video Call".to_string();
        long_session.price = 120;

        let raw = vec![("-Na1".to_string(), long_session)];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        let enriched = enrich(&raw, &doctors, today());
        assert_eq!(enriched[0].time_range, "04:00 PM – 04:30 PM");
        assert_eq!(enriched[0].duration_label, "30 minutes");
    }

    #[test]
    fn grouping_hides_unknown_statuses() {
        let raw = vec![
            (
                "-Na1".to_string(),
                appointment("d1", "2025-03-05", "2:00 PM", Some("Confirmed")),
            ),
            (
                "-Na2".to_string(),
                appointment("d1", "2025-03-01", "9:00 AM", Some("Completed")),
            ),
            (
                "-Na3".to_string(),
                appointment("d1", "2025-03-02", "9:00 AM", Some("Cancelled")),
            ),
            (
                "-Na4".to_string(),
                appointment("d1", "2025-03-03", "9:00 AM", Some("Rescheduled")),
            ),
        ];
        let doctors = vec![doctor("d1", "Dr. Jenny Watson")];

        let enriched = enrich(&raw, &doctors, today());
        assert_eq!(enriched.len(), 4);

        let buckets = group_by_status(&enriched);
        assert_eq!(buckets.upcoming.len(), 1);
        assert_eq!(buckets.completed.len(), 1);
        assert_eq!(buckets.cancelled.len(), 1);

        let bucketed = buckets.upcoming.len() + buckets.completed.len() + buckets.cancelled.len();
        assert_eq!(bucketed, 3, "unknown status must land in no bucket");
    }
}
