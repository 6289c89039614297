use tracing::info;

use appointment_cell::models::{PatientRecord, RawAppointment};
use appointment_cell::services::display::parse_iso_date;
use appointment_cell::services::schedule::parse_clock_time;
use shared_config::AppConfig;
use shared_database::RealtimeClient;

use crate::models::{BookingError, BookingSnapshot, PAYMENT_METHOD_CARD};

/// Turns a completed booking session into a persisted appointment document.
pub struct CheckoutService {
    client: RealtimeClient,
}

impl CheckoutService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RealtimeClient::new(config),
        }
    }

    /// Validate every wizard gate, then persist the appointment under the
    /// user's collection. Returns the generated appointment key.
    pub async fn confirm(
        &self,
        user_id: &str,
        snapshot: &BookingSnapshot,
        auth_token: Option<&str>,
    ) -> Result<String, BookingError> {
        Self::validate(snapshot)?;
        let document = Self::document(snapshot)?;

        let value = serde_json::to_value(&document)
            .map_err(|e| BookingError::ValidationError(e.to_string()))?;

        let path = format!("appointments/{}", user_id);
        let key = self
            .client
            .push(&path, auth_token, value)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        info!(
            "Booked {} appointment {} with doctor {} for {}",
            snapshot.package_type, key, snapshot.doctor_id, user_id
        );
        Ok(key)
    }

    pub fn validate(snapshot: &BookingSnapshot) -> Result<(), BookingError> {
        if !snapshot.date_time_selected() {
            return Err(BookingError::IncompleteStep("date and time".to_string()));
        }
        if !snapshot.package_selected() {
            return Err(BookingError::IncompleteStep("package".to_string()));
        }
        if !snapshot.patient_details_complete() {
            return Err(BookingError::IncompleteStep("patient details".to_string()));
        }
        if !snapshot.payment_selected() {
            return Err(BookingError::IncompleteStep("payment method".to_string()));
        }

        if snapshot.payment_method.as_deref() == Some(PAYMENT_METHOD_CARD) {
            let selected = snapshot
                .selected_card_id
                .ok_or_else(|| BookingError::ValidationError("No card selected".to_string()))?;
            if snapshot.card(selected).is_none() {
                return Err(BookingError::CardNotFound);
            }
        }

        if parse_iso_date(&snapshot.selected_date).is_none() {
            return Err(BookingError::ValidationError(format!(
                "Unparsable date: {}",
                snapshot.selected_date
            )));
        }
        if parse_clock_time(&snapshot.selected_time).is_none() {
            return Err(BookingError::ValidationError(format!(
                "Unparsable time: {}",
                snapshot.selected_time
            )));
        }

        Ok(())
    }

    /// Shape the document exactly as the appointment readers expect it.
    fn document(snapshot: &BookingSnapshot) -> Result<RawAppointment, BookingError> {
        let age = snapshot
            .patient_age
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0);

        Ok(RawAppointment {
            patient_details: PatientRecord {
                full_name: snapshot.patient_name.clone(),
                gender: snapshot.patient_gender.clone(),
                age,
                problem: snapshot.patient_problem.clone(),
            },
            doctor_id: snapshot.doctor_id.clone(),
            date: snapshot.selected_date.clone(),
            time: snapshot.selected_time.clone(),
            package: snapshot.package_type.clone(),
            price: snapshot.package_price,
            status: Some("Confirmed".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn complete_snapshot() -> BookingSnapshot {
        BookingSnapshot {
            doctor_id: "d1".to_string(),
            selected_date: "2025-03-05".to_string(),
            selected_time: "2:00 PM".to_string(),
            package_type: "Voice Call".to_string(),
            duration_minutes: 45,
            package_price: 60,
            patient_name: "Andrew Ainsley Johnson".to_string(),
            patient_gender: "Male".to_string(),
            patient_age: "27 years".to_string(),
            patient_problem: "Persistent migraines and light sensitivity".to_string(),
            payment_method: Some("PayPal".to_string()),
            saved_cards: Vec::new(),
            selected_card_id: None,
        }
    }

    #[test]
    fn complete_snapshot_validates() {
        assert!(CheckoutService::validate(&complete_snapshot()).is_ok());
    }

    #[test]
    fn each_missing_step_is_reported() {
        let mut snapshot = complete_snapshot();
        snapshot.selected_time.clear();
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::IncompleteStep(step)) if step == "date and time"
        );

        let mut snapshot = complete_snapshot();
        snapshot.package_type.clear();
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::IncompleteStep(step)) if step == "package"
        );

        let mut snapshot = complete_snapshot();
        snapshot.patient_name = "Andrew".to_string();
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::IncompleteStep(step)) if step == "patient details"
        );

        let mut snapshot = complete_snapshot();
        snapshot.payment_method = None;
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::IncompleteStep(step)) if step == "payment method"
        );
    }

    #[test]
    fn card_method_without_a_card_is_rejected() {
        let mut snapshot = complete_snapshot();
        snapshot.payment_method = Some("Card".to_string());
        snapshot.selected_card_id = None;
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::ValidationError(_))
        );
    }

    #[test]
    fn unparsable_date_or_time_is_rejected() {
        let mut snapshot = complete_snapshot();
        snapshot.selected_date = "March 5, 2025".to_string();
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::ValidationError(_))
        );

        let mut snapshot = complete_snapshot();
        snapshot.selected_time = "25:99 XM".to_string();
        assert_matches!(
            CheckoutService::validate(&snapshot),
            Err(BookingError::ValidationError(_))
        );
    }

    #[test]
    fn document_carries_the_confirmed_status_and_parsed_age() {
        let document = CheckoutService::document(&complete_snapshot()).unwrap();
        assert_eq!(document.status.as_deref(), Some("Confirmed"));
        assert_eq!(document.patient_details.age, 27);
        assert_eq!(document.price, 60);
        assert_eq!(document.date, "2025-03-05");
    }
}
