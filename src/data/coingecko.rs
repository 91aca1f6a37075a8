//! CoinGecko `simple/price` quotes (crypto).

use serde_json::Value;

use crate::config::CryptoConfig;
use crate::data::JsonClient;
use crate::error::Result;

pub struct CoinGeckoClient<'a> {
    http: JsonClient,
    config: &'a CryptoConfig,
}

impl<'a> CoinGeckoClient<'a> {
    pub fn new(http: JsonClient, config: &'a CryptoConfig) -> Self {
        Self { http, config }
    }

    pub fn fetch_prices(&self) -> Result<Value> {
        let vs = self.config.quote_currencies.join(",");
        self.http.get_json(
            "coingecko",
            &self.config.url,
            &[("ids", self.config.coin_id.as_str()), ("vs_currencies", vs.as_str())],
        )
    }
}
