//! Blocking JSON GET shared by the provider clients.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct JsonClient {
    client: Client,
}

impl JsonClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` with `query` and decode the body as JSON.
    ///
    /// `provider` only labels error messages; query values are never logged.
    pub fn get_json(&self, provider: &str, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        debug!(provider, url, "Requesting");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| AppError::Network(format!("{provider} request failed: {}", e.without_url())))?;

        if !resp.status().is_success() {
            return Err(AppError::Network(format!(
                "{provider} request failed with status {}.",
                resp.status()
            )));
        }

        resp.json::<Value>()
            .map_err(|e| AppError::Network(format!("Failed to parse {provider} response: {}", e.without_url())))
    }
}
