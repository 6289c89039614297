use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A doctor profile as stored under `doctors/{id}`. The id is the node key,
/// not a document field; decode fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub hospital: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: i64,
}

impl Doctor {
    /// Hospital-plus-city composite shown on appointment cards.
    pub fn display_location(&self) -> String {
        format!("{} in {}", self.hospital, self.location)
    }
}

/// Decode the `doctors` collection snapshot. Entries that fail to decode are
/// skipped with a warning so one malformed profile never hides the rest.
pub fn decode_doctors(snapshot: &Value) -> Vec<Doctor> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, node)| match serde_json::from_value::<Doctor>(node.clone()) {
            Ok(mut doctor) => {
                doctor.id = key.clone();
                Some(doctor)
            }
            Err(err) => {
                warn!("Skipping undecodable doctor {}: {}", key, err);
                None
            }
        })
        .collect()
}
