//! Provider clients for the fetch stage.
//!
//! Each client returns the decoded JSON body untouched; flattening into raw
//! records belongs to the domain's normalizer (`crate::normalize`).

pub mod coingecko;
pub mod currencyapi;
pub mod http;
pub mod remotive;
pub mod worldbank;

pub use coingecko::CoinGeckoClient;
pub use currencyapi::CurrencyApiClient;
pub use http::JsonClient;
pub use remotive::RemotiveClient;
pub use worldbank::WorldBankClient;
