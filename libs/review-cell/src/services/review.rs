use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::RealtimeClient;

use crate::models::{decode_reviews, Review, ReviewDraft, ReviewError, ReviewSummary};

pub struct ReviewService {
    client: RealtimeClient,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RealtimeClient::new(config),
        }
    }

    /// Validate and persist a draft. Returns the generated review key.
    pub async fn submit(
        &self,
        draft: &ReviewDraft,
        auth_token: Option<&str>,
    ) -> Result<String, ReviewError> {
        draft.validate()?;

        let review = Review {
            user_id: draft.user_id.clone(),
            doctor_id: draft.doctor_id.clone(),
            doctor_name: draft.doctor_name.clone(),
            rating: draft.rating,
            review_text: draft.review_text.clone(),
            // Validated just above; unanswered drafts never get this far.
            recommend: draft.recommend.unwrap_or(false),
            timestamp: Utc::now().timestamp_millis(),
        };

        let value = serde_json::to_value(&review)
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        let key = self
            .client
            .push("reviews", auth_token, value)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        info!("Review {} submitted for doctor {}", key, review.doctor_id);
        Ok(key)
    }

    /// Reviews for one doctor, newest first, optionally filtered to an exact
    /// star rating.
    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
        rating: Option<i64>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Review>, ReviewError> {
        let snapshot: Value = self
            .client
            .get("reviews", auth_token)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        let mut reviews = filter_reviews(decode_reviews(&snapshot), doctor_id, rating);
        reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!("{} reviews match doctor {}", reviews.len(), doctor_id);
        Ok(reviews)
    }

    pub async fn summary(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<ReviewSummary, ReviewError> {
        let reviews = self.list_for_doctor(doctor_id, None, auth_token).await?;
        Ok(summarize(&reviews))
    }
}

pub fn filter_reviews(reviews: Vec<Review>, doctor_id: &str, rating: Option<i64>) -> Vec<Review> {
    reviews
        .into_iter()
        .filter(|review| review.doctor_id == doctor_id)
        .filter(|review| rating.map_or(true, |wanted| review.rating == wanted))
        .collect()
}

pub fn summarize(reviews: &[Review]) -> ReviewSummary {
    if reviews.is_empty() {
        return ReviewSummary::default();
    }

    let total: i64 = reviews.iter().map(|review| review.rating).sum();
    ReviewSummary {
        average_rating: total as f64 / reviews.len() as f64,
        review_count: reviews.len(),
    }
}
