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

use crate::services::{DoctorService, FavoritesService};

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub speciality: Option<String>,
}

fn bearer(auth: &Option<TypedHeader<Authorization<Bearer>>>) -> Option<&str> {
    auth.as_ref().map(|header| header.token())
}

fn require_bearer(auth: &Option<TypedHeader<Authorization<Bearer>>>) -> Result<&str, AppError> {
    bearer(auth).ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);

    let doctors = match query.speciality {
        Some(speciality) => service
            .by_speciality(&speciality, bearer(&auth))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?,
        None => service
            .list(bearer(&auth))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?,
    };

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);

    let doctor = service
        .get(&doctor_id, bearer(&auth))
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn list_favorites(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = FavoritesService::new(&state);

    let doctors = service
        .favorite_doctors(&user_id, bearer(&auth))
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "favorites": doctors
    })))
}

#[axum::debug_handler]
pub async fn add_favorite(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path((user_id, doctor_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let token = require_bearer(&auth)?;
    let service = FavoritesService::new(&state);

    let ids = service
        .add(&user_id, &doctor_id, Some(token))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "favoriteIds": ids
    })))
}

#[axum::debug_handler]
pub async fn remove_favorite(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path((user_id, doctor_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let token = require_bearer(&auth)?;
    let service = FavoritesService::new(&state);

    let ids = service
        .remove(&user_id, &doctor_id, Some(token))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "favoriteIds": ids
    })))
}
