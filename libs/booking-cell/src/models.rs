use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Payment method sentinel meaning "the selected saved card".
pub const PAYMENT_METHOD_CARD: &str = "Card";

/// A consultation modality with its base price per 30 minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationPackage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_price: i64,
}

/// A saved payment card. The PAN is held in display format ("#### #### ####
/// ####"); only masking and length checks ever apply to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: Uuid,
    pub holder_name: String,
    pub number: String,
    pub expiry: String,
    /// Never echoed back to clients.
    #[serde(skip_serializing)]
    pub cvv: String,
    pub network: String,
}

/// The in-progress booking wizard state. Mutated only through
/// `BookingSession`, which replaces the whole snapshot per operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub doctor_id: String,
    pub selected_date: String,
    pub selected_time: String,
    pub package_type: String,
    pub duration_minutes: i64,
    pub package_price: i64,
    pub patient_name: String,
    pub patient_gender: String,
    pub patient_age: String,
    pub patient_problem: String,
    /// Mutually exclusive with `selected_card_id` unless it holds the
    /// "Card" sentinel, in which case the card id is the selection.
    pub payment_method: Option<String>,
    pub saved_cards: Vec<CreditCard>,
    pub selected_card_id: Option<Uuid>,
}

impl BookingSnapshot {
    pub fn date_time_selected(&self) -> bool {
        !self.selected_date.is_empty() && !self.selected_time.is_empty()
    }

    pub fn package_selected(&self) -> bool {
        !self.package_type.is_empty()
    }

    pub fn patient_details_complete(&self) -> bool {
        patient_details_valid(
            &self.patient_name,
            &self.patient_gender,
            &self.patient_age,
            &self.patient_problem,
        )
    }

    pub fn payment_selected(&self) -> bool {
        self.payment_method.is_some()
    }

    pub fn card(&self, card_id: Uuid) -> Option<&CreditCard> {
        self.saved_cards.iter().find(|card| card.id == card_id)
    }

    pub fn ready_to_confirm(&self) -> bool {
        self.date_time_selected()
            && self.package_selected()
            && self.patient_details_complete()
            && self.payment_selected()
    }
}

/// Patient-details gate: the wizard's Next stays disabled until every field
/// clears its threshold. The 15-character name minimum effectively demands a
/// full first and last name.
pub fn patient_details_valid(name: &str, gender: &str, age: &str, problem: &str) -> bool {
    name.chars().count() >= 15
        && problem.chars().count() >= 35
        && !gender.is_empty()
        && !age.is_empty()
}

#[derive(Debug, Clone, Error)]
pub enum BookingError {
    #[error("Booking session not found")]
    SessionNotFound,

    #[error("Card not found")]
    CardNotFound,

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("Step not complete: {0}")]
    IncompleteStep(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
