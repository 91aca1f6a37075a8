//! Remotive remote-job listings.

use serde_json::Value;

use crate::config::JobsConfig;
use crate::data::JsonClient;
use crate::error::Result;

pub struct RemotiveClient<'a> {
    http: JsonClient,
    config: &'a JobsConfig,
}

impl<'a> RemotiveClient<'a> {
    pub fn new(http: JsonClient, config: &'a JobsConfig) -> Self {
        Self { http, config }
    }

    pub fn fetch_jobs(&self) -> Result<Value> {
        self.http.get_json("remotive", &self.config.url, &[])
    }
}
