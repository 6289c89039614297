use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// REST client for the hosted realtime document store.
///
/// Every node is addressed by a slash-separated path; the store speaks JSON
/// for reads and writes. Auth tokens issued by the platform are passed
/// through per request; the configured database secret is the fallback for
/// server-side access.
#[derive(Clone)]
pub struct RealtimeClient {
    client: Client,
    base_url: String,
    database_secret: String,
    poll_interval: Duration,
}

impl RealtimeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_url.trim_end_matches('/').to_string(),
            database_secret: config.database_secret.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn node_url(&self, path: &str, auth_token: Option<&str>) -> String {
        let mut url = format!("{}/{}.json", self.base_url, path.trim_matches('/'));
        let token = auth_token.filter(|t| !t.is_empty()).or_else(|| {
            (!self.database_secret.is_empty()).then_some(self.database_secret.as_str())
        });
        if let Some(token) = token {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.node_url(path, auth_token);
        debug!("Making {} request to node {}", method, path);

        let mut req = self.client.request(method, &url);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Node not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// One-shot read of a node. Absent nodes come back as JSON null.
    pub async fn get<T>(&self, path: &str, auth_token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, auth_token, None).await
    }

    /// Replace a node's value.
    pub async fn put(&self, path: &str, auth_token: Option<&str>, value: Value) -> Result<Value> {
        self.request(Method::PUT, path, auth_token, Some(value)).await
    }

    /// Merge fields into a node without replacing siblings.
    pub async fn patch(&self, path: &str, auth_token: Option<&str>, value: Value) -> Result<Value> {
        self.request(Method::PATCH, path, auth_token, Some(value)).await
    }

    /// Append a value under a generated child key and return that key.
    pub async fn push(&self, path: &str, auth_token: Option<&str>, value: Value) -> Result<String> {
        let result: Value = self.request(Method::POST, path, auth_token, Some(value)).await?;

        result
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Store did not return a generated key"))
    }

    /// Remove a node.
    pub async fn delete(&self, path: &str, auth_token: Option<&str>) -> Result<()> {
        let _: Value = self.request(Method::DELETE, path, auth_token, None).await?;
        Ok(())
    }
}
