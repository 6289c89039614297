use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_secret: String,
    pub poll_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("ONMED_DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("ONMED_DATABASE_URL not set, using empty value");
                    String::new()
                }),
            database_secret: env::var("ONMED_DATABASE_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ONMED_DATABASE_SECRET not set, using empty value");
                    String::new()
                }),
            poll_interval_secs: env::var("ONMED_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(5),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
    }
}
