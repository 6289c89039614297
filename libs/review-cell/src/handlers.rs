use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ReviewDraft, ReviewError};
use crate::services::review::{summarize, ReviewService};

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    /// Exact star filter; absent means all ratings.
    pub rating: Option<i64>,
}

fn review_error(err: ReviewError) -> AppError {
    match err {
        ReviewError::RatingRequired
        | ReviewError::EmptyReview
        | ReviewError::RecommendUnanswered => AppError::ValidationError(err.to_string()),
        ReviewError::DatabaseError(message) => AppError::Database(message),
    }
}

#[axum::debug_handler]
pub async fn submit_review(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(draft): Json<ReviewDraft>,
) -> Result<Json<Value>, AppError> {
    let token = auth
        .as_ref()
        .map(|header| header.token())
        .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?;

    let service = ReviewService::new(&state);
    let key = service
        .submit(&draft, Some(token))
        .await
        .map_err(review_error)?;

    Ok(Json(json!({
        "success": true,
        "reviewKey": key
    })))
}

#[axum::debug_handler]
pub async fn list_doctor_reviews(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Value>, AppError> {
    let token = auth.as_ref().map(|header| header.token());
    let service = ReviewService::new(&state);

    let reviews = service
        .list_for_doctor(&doctor_id, query.rating, token)
        .await
        .map_err(review_error)?;

    // The summary always spans every rating, even when the list is filtered.
    let summary = match query.rating {
        None => summarize(&reviews),
        Some(_) => service
            .summary(&doctor_id, token)
            .await
            .map_err(review_error)?,
    };

    Ok(Json(json!({
        "success": true,
        "reviews": reviews,
        "summary": summary
    })))
}
