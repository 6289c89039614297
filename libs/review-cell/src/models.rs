use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// A review being composed. Becomes an immutable `Review` only on submit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub user_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub rating: i64,
    pub review_text: String,
    /// Tri-state: yes / no / unanswered. Submit requires an answer.
    pub recommend: Option<bool>,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.rating < 1 || self.rating > 5 {
            return Err(ReviewError::RatingRequired);
        }
        if self.review_text.trim().is_empty() {
            return Err(ReviewError::EmptyReview);
        }
        if self.recommend.is_none() {
            return Err(ReviewError::RecommendUnanswered);
        }
        Ok(())
    }
}

/// A persisted review under `reviews/{pushKey}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub rating: i64,
    pub review_text: String,
    pub recommend: bool,
    /// Milliseconds since the epoch, stamped at submit time.
    pub timestamp: i64,
}

/// Decode the `reviews` collection snapshot, skipping malformed children.
pub fn decode_reviews(snapshot: &Value) -> Vec<Review> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, node)| match serde_json::from_value::<Review>(node.clone()) {
            Ok(review) => Some(review),
            Err(err) => {
                warn!("Skipping undecodable review {}: {}", key, err);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    #[error("A star rating between 1 and 5 is required")]
    RatingRequired,

    #[error("Review text must not be blank")]
    EmptyReview,

    #[error("The recommend question must be answered")]
    RecommendUnanswered,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
