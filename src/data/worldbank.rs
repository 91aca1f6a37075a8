//! World Bank indicator API (inflation), one request per country.

use serde_json::Value;

use crate::config::{Country, InflationConfig};
use crate::data::JsonClient;
use crate::error::Result;

pub struct WorldBankClient<'a> {
    http: JsonClient,
    config: &'a InflationConfig,
}

impl<'a> WorldBankClient<'a> {
    pub fn new(http: JsonClient, config: &'a InflationConfig) -> Self {
        Self { http, config }
    }

    /// Latest datapoint only (`per_page=1`); the body is `[metadata, datapoints]`.
    pub fn fetch_latest(&self, country: &Country) -> Result<Value> {
        let url = format!(
            "{}/{}/indicator/{}",
            self.config.url.trim_end_matches('/'),
            country.code,
            self.config.indicator
        );
        self.http
            .get_json("world bank", &url, &[("format", "json"), ("per_page", "1")])
    }
}
