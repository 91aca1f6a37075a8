//! currencyapi.com `latest` rates (forex).

use serde_json::Value;

use crate::config::ForexConfig;
use crate::data::JsonClient;
use crate::error::{AppError, Result};

pub struct CurrencyApiClient<'a> {
    http: JsonClient,
    api_key: String,
    config: &'a ForexConfig,
}

impl<'a> CurrencyApiClient<'a> {
    /// Reads the API key from the environment (`.env` is honoured).
    pub fn from_env(http: JsonClient, config: &'a ForexConfig) -> Result<Self> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("Missing {} in environment (.env).", config.api_key_env)))?;
        Ok(Self { http, api_key, config })
    }

    pub fn fetch_latest(&self) -> Result<Value> {
        let currencies = self.config.target_currencies.join(",");
        self.http.get_json(
            "currencyapi",
            &self.config.url,
            &[
                ("apikey", self.api_key.as_str()),
                ("base_currency", self.config.base_currency.as_str()),
                ("currencies", currencies.as_str()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_key_is_config_error() {
        let config = ForexConfig {
            api_key_env: "PULSE_TEST_UNSET_CURRENCYAPI_KEY".to_string(),
            ..ForexConfig::default()
        };
        let http = JsonClient::new(Duration::from_secs(1)).unwrap();
        let err = CurrencyApiClient::from_env(http, &config).err().unwrap();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("PULSE_TEST_UNSET_CURRENCYAPI_KEY")));
    }
}
