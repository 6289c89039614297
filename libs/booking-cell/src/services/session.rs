use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{BookingError, BookingSnapshot, CreditCard, PAYMENT_METHOD_CARD};

/// One in-progress booking, shared by the wizard's steps.
///
/// Every mutator builds a fresh snapshot and publishes it whole; observers
/// never see a half-applied step. The payment selection invariant is
/// enforced here: at most one of {generic payment method, selected card} is
/// active after any mutation, with the "Card" sentinel tying the two
/// together when a card is selected.
pub struct BookingSession {
    tx: watch::Sender<BookingSnapshot>,
}

impl BookingSession {
    pub fn new(doctor_id: impl Into<String>) -> Self {
        let snapshot = BookingSnapshot {
            doctor_id: doctor_id.into(),
            ..BookingSnapshot::default()
        };
        let (tx, _) = watch::channel(snapshot);
        Self { tx }
    }

    pub fn snapshot(&self) -> BookingSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BookingSnapshot> {
        self.tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut BookingSnapshot)) {
        let mut next = self.tx.borrow().clone();
        apply(&mut next);
        // Publish unconditionally; `send_replace` stores the new snapshot and
        // notifies observers even when nobody is subscribed yet (plain `send`
        // would drop the update when there are no receivers).
        let _ = self.tx.send_replace(next);
    }

    pub fn set_date_time(&self, date: &str, time: &str) {
        self.update(|snapshot| {
            snapshot.selected_date = date.to_string();
            snapshot.selected_time = time.to_string();
        });
    }

    pub fn set_package(&self, package_type: &str, duration_minutes: i64, price: i64) {
        self.update(|snapshot| {
            snapshot.package_type = package_type.to_string();
            snapshot.duration_minutes = duration_minutes;
            snapshot.package_price = price;
        });
    }

    pub fn set_patient_details(&self, name: &str, gender: &str, age: &str, problem: &str) {
        self.update(|snapshot| {
            snapshot.patient_name = name.to_string();
            snapshot.patient_gender = gender.to_string();
            snapshot.patient_age = age.to_string();
            snapshot.patient_problem = problem.to_string();
        });
    }

    /// Choose a generic payment method. Any selected card is cleared; the
    /// two selections are never active together.
    pub fn set_payment_method(&self, method: &str) {
        self.update(|snapshot| {
            snapshot.payment_method = Some(method.to_string());
            snapshot.selected_card_id = None;
        });
    }

    /// Select a saved card, which makes "Card" the payment method.
    pub fn select_card(&self, card_id: Uuid) -> Result<(), BookingError> {
        if self.tx.borrow().card(card_id).is_none() {
            return Err(BookingError::CardNotFound);
        }
        self.update(|snapshot| {
            snapshot.selected_card_id = Some(card_id);
            snapshot.payment_method = Some(PAYMENT_METHOD_CARD.to_string());
        });
        Ok(())
    }

    /// Save a new card. The card becomes the active payment selection.
    pub fn add_card(&self, card: CreditCard) {
        self.update(|snapshot| {
            snapshot.selected_card_id = Some(card.id);
            snapshot.payment_method = Some(PAYMENT_METHOD_CARD.to_string());
            snapshot.saved_cards.push(card);
        });
    }

    /// Replace a saved card by id and re-select it. Unknown ids are ignored.
    pub fn update_card(&self, card: CreditCard) {
        self.update(|snapshot| {
            if let Some(existing) = snapshot
                .saved_cards
                .iter_mut()
                .find(|saved| saved.id == card.id)
            {
                let card_id = card.id;
                *existing = card;
                snapshot.selected_card_id = Some(card_id);
                snapshot.payment_method = Some(PAYMENT_METHOD_CARD.to_string());
            }
        });
    }

    pub fn clear_selected_card(&self) {
        self.update(|snapshot| {
            snapshot.selected_card_id = None;
        });
    }
}
