use anyhow::Result;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::RealtimeClient;

use crate::models::{decode_doctors, Doctor};

/// Per-user favorite doctors, stored as a flat id list at `favorites/{uid}`.
pub struct FavoritesService {
    client: RealtimeClient,
}

impl FavoritesService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RealtimeClient::new(config),
        }
    }

    pub async fn ids(&self, user_id: &str, auth_token: Option<&str>) -> Result<Vec<String>> {
        let path = format!("favorites/{}", user_id);
        let snapshot: Value = self.client.get(&path, auth_token).await?;

        let Some(entries) = snapshot.as_array() else {
            return Ok(Vec::new());
        };

        Ok(entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    pub async fn add(&self, user_id: &str, doctor_id: &str, auth_token: Option<&str>) -> Result<Vec<String>> {
        let mut ids = self.ids(user_id, auth_token).await?;
        if !ids.iter().any(|id| id == doctor_id) {
            ids.push(doctor_id.to_string());
        }
        self.store(user_id, &ids, auth_token).await?;
        Ok(ids)
    }

    pub async fn remove(&self, user_id: &str, doctor_id: &str, auth_token: Option<&str>) -> Result<Vec<String>> {
        let mut ids = self.ids(user_id, auth_token).await?;
        ids.retain(|id| id != doctor_id);
        self.store(user_id, &ids, auth_token).await?;
        Ok(ids)
    }

    /// Join the favorite id list against the doctor directory. Ids that no
    /// longer resolve to a doctor are dropped, same rule as the appointment
    /// enricher.
    pub async fn favorite_doctors(&self, user_id: &str, auth_token: Option<&str>) -> Result<Vec<Doctor>> {
        let ids = self.ids(user_id, auth_token).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot: Value = self.client.get("doctors", auth_token).await?;
        let directory = decode_doctors(&snapshot);

        let favorites = ids
            .iter()
            .filter_map(|id| directory.iter().find(|doctor| &doctor.id == id).cloned())
            .collect::<Vec<_>>();

        debug!(
            "Resolved {} of {} favorite ids for {}",
            favorites.len(),
            ids.len(),
            user_id
        );
        Ok(favorites)
    }

    async fn store(&self, user_id: &str, ids: &[String], auth_token: Option<&str>) -> Result<()> {
        let path = format!("favorites/{}", user_id);
        self.client.put(&path, auth_token, json!(ids)).await?;
        Ok(())
    }
}
