use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::RealtimeClient;

use crate::models::{decode_doctors, Doctor};

pub struct DoctorService {
    client: RealtimeClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RealtimeClient::new(config),
        }
    }

    /// Fetch the whole doctor directory.
    pub async fn list(&self, auth_token: Option<&str>) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor directory");
        let snapshot: Value = self.client.get("doctors", auth_token).await?;
        Ok(decode_doctors(&snapshot))
    }

    /// Fetch a single doctor by id.
    pub async fn get(&self, doctor_id: &str, auth_token: Option<&str>) -> Result<Option<Doctor>> {
        debug!("Fetching doctor {}", doctor_id);
        let path = format!("doctors/{}", doctor_id);
        let snapshot: Value = self.client.get(&path, auth_token).await?;

        if snapshot.is_null() {
            return Ok(None);
        }

        let mut doctor: Doctor = serde_json::from_value(snapshot)?;
        doctor.id = doctor_id.to_string();
        Ok(Some(doctor))
    }

    /// List doctors for one speciality (case-insensitive match).
    pub async fn by_speciality(
        &self,
        speciality: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>> {
        let wanted = speciality.to_lowercase();
        let doctors = self.list(auth_token).await?;
        Ok(doctors
            .into_iter()
            .filter(|doctor| doctor.speciality.to_lowercase() == wanted)
            .collect())
    }
}
