//! Run configuration.
//!
//! Everything a normalizer or provider client needs (currency lists, stopwords,
//! URLs, the crypto reference currency) lives in these structs and is passed in
//! explicitly. Defaults match the providers the pipeline was built against.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Where raw snapshots are read/written and where report tables live.
#[derive(Debug, Clone)]
pub struct Paths {
    pub raw_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("outputs/raw"),
            reports_dir: PathBuf::from("outputs/reports"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForexConfig {
    pub url: String,
    pub base_currency: String,
    pub target_currencies: Vec<String>,
    pub source: String,
    /// Environment variable holding the currencyapi key.
    pub api_key_env: String,
}

impl Default for ForexConfig {
    fn default() -> Self {
        Self {
            url: "https://api.currencyapi.com/v3/latest".to_string(),
            base_currency: "USD".to_string(),
            target_currencies: codes(&["EUR", "ARS", "BRL", "CLP", "MXN", "PEN"]),
            source: "currencyapi".to_string(),
            api_key_env: "CURRENCYAPI_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CryptoConfig {
    pub url: String,
    /// Provider asset id (CoinGecko uses ids, not symbols).
    pub coin_id: String,
    pub symbol: String,
    /// Quote currencies requested from the provider (lowercase, provider style).
    pub quote_currencies: Vec<String>,
    /// Currency whose quote anchors the `price_usd` cross-rate.
    pub reference_currency: String,
    pub source: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            coin_id: "bitcoin".to_string(),
            symbol: "BTC".to_string(),
            quote_currencies: codes(&["usd", "ars", "eur", "brl", "clp", "mxn", "pen"]),
            reference_currency: "USD".to_string(),
            source: "coingecko".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Country {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InflationConfig {
    pub url: String,
    /// World Bank indicator: inflation, consumer prices (annual %).
    pub indicator: String,
    pub countries: Vec<Country>,
    pub source: String,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self {
            url: "https://api.worldbank.org/v2/country".to_string(),
            indicator: "FP.CPI.TOTL.ZG".to_string(),
            countries: vec![
                Country::new("ARG", "Argentina"),
                Country::new("BRA", "Brazil"),
                Country::new("CHL", "Chile"),
                Country::new("MEX", "Mexico"),
                Country::new("PER", "Peru"),
                Country::new("USA", "United States"),
            ],
            source: "world_bank".to_string(),
        }
    }
}

/// Skill token extraction settings.
#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub stopwords: HashSet<String>,
    pub top_n: usize,
    pub min_token_len: usize,
}

impl SkillConfig {
    pub fn with_stopwords(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
            ..Self::default()
        }
    }
}

impl Default for SkillConfig {
    fn default() -> Self {
        const STOPWORDS: [&str; 17] = [
            "remote", "job", "jobs", "senior", "junior", "sr", "jr", "developer", "engineer", "manager",
            "analyst", "full", "time", "part", "stack", "lead", "software",
        ];
        Self {
            stopwords: STOPWORDS.iter().map(|w| w.to_string()).collect(),
            top_n: 30,
            min_token_len: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub url: String,
    pub skills: SkillConfig,
}

impl JobsConfig {
    pub fn new(skills: SkillConfig) -> Self {
        Self {
            url: "https://remotive.com/api/remote-jobs".to_string(),
            skills,
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self::new(SkillConfig::default())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Built from CLI flags (plus defaults) in `app`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub paths: Paths,
    pub forex: ForexConfig,
    pub crypto: CryptoConfig,
    pub inflation: InflationConfig,
    pub jobs: JobsConfig,
    pub http_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            forex: ForexConfig::default(),
            crypto: CryptoConfig::default(),
            inflation: InflationConfig::default(),
            jobs: JobsConfig::default(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}
