//! Shared domain types.
//!
//! This module defines:
//!
//! - the dataset enum (`Domain`) and the report tables each domain feeds (`ReportKind`)
//! - the logical run date of a snapshot (`RunDate`)
//! - loosely-typed provider records (`RawRecord`, `RawValue`)
//! - canonical report rows, one struct per report schema

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AppError;

/// One external dataset ingested once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Forex,
    Crypto,
    Inflation,
    Jobs,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Forex, Domain::Crypto, Domain::Inflation, Domain::Jobs];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Forex => "forex",
            Domain::Crypto => "crypto",
            Domain::Inflation => "inflation",
            Domain::Jobs => "jobs",
        }
    }

    /// File-name prefix of raw snapshots, e.g. `raw_forex_`.
    pub fn raw_prefix(self) -> String {
        format!("raw_{}_", self.as_str())
    }

    /// Report tables materialized from this domain, in merge order.
    pub fn reports(self) -> &'static [ReportKind] {
        match self {
            Domain::Forex => &[ReportKind::ForexDaily],
            Domain::Crypto => &[ReportKind::CryptoDaily],
            Domain::Inflation => &[ReportKind::InflationDaily],
            Domain::Jobs => &[
                ReportKind::SkillsDemanded,
                ReportKind::JobsByCountry,
                ReportKind::JobGrowth,
                ReportKind::AverageSalaries,
            ],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    ForexDaily,
    CryptoDaily,
    InflationDaily,
    SkillsDemanded,
    JobsByCountry,
    JobGrowth,
    AverageSalaries,
}

impl ReportKind {
    pub const ALL: [ReportKind; 7] = [
        ReportKind::ForexDaily,
        ReportKind::CryptoDaily,
        ReportKind::InflationDaily,
        ReportKind::SkillsDemanded,
        ReportKind::JobsByCountry,
        ReportKind::JobGrowth,
        ReportKind::AverageSalaries,
    ];

    /// Store-relative table name (`<group>/<file stem>`).
    pub fn table_name(self) -> &'static str {
        match self {
            ReportKind::ForexDaily => "economy/forex_daily",
            ReportKind::CryptoDaily => "economy/crypto_daily",
            ReportKind::InflationDaily => "economy/inflation_daily",
            ReportKind::SkillsDemanded => "jobs/skills_demanded_daily",
            ReportKind::JobsByCountry => "jobs/remote_jobs_by_country_daily",
            ReportKind::JobGrowth => "jobs/job_growth_daily",
            ReportKind::AverageSalaries => "jobs/average_salaries_daily",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Logical calendar date a snapshot represents.
///
/// Accepts `YYYY-MM-DD` and the file-name form `YYYY_MM_DD`; always renders as
/// `YYYY-MM-DD`. Equality is by calendar day, so both textual forms compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunDate(NaiveDate);

impl RunDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn parse(s: &str) -> Option<Self> {
        const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y_%m_%d"];
        let s = s.trim();
        FMTS.iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .map(Self)
    }

    /// `YYYY_MM_DD`, as embedded in raw snapshot file names.
    pub fn file_stamp(self) -> String {
        self.0.format("%Y_%m_%d").to_string()
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for RunDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            AppError::Schema(format!("invalid run date '{s}' (expected YYYY-MM-DD or YYYY_MM_DD)"))
        })
    }
}

impl Serialize for RunDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A scalar as delivered by a provider or read back from a raw snapshot file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Text(String),
    Number(f64),
}

impl RawValue {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
            other => RawValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Non-empty text form; `None` for nulls and blank strings.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Null => None,
            RawValue::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then_some(Cow::Borrowed(s))
            }
            RawValue::Number(n) => Some(Cow::Owned(n.to_string())),
        }
    }

    /// Numeric coercion; text is parsed, non-finite values are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Null => return None,
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// Cell text for a CSV file (nulls become empty cells).
    pub fn to_cell(&self) -> String {
        match self {
            RawValue::Null => String::new(),
            RawValue::Text(s) => s.clone(),
            RawValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

/// Untyped record: field name -> scalar, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: IndexMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(RawValue::as_text).map(Cow::into_owned)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(RawValue::as_f64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A row that can be merged into a report table.
///
/// The serialized field order is the table header; `run_date` must be the last field.
pub trait ReportRow: Serialize {
    fn run_date(&self) -> RunDate;
}

/// Normalized forex rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForexRow {
    pub base_currency: String,
    pub target_currency: String,
    pub rate: f64,
    pub rate_date: NaiveDate,
    pub source: String,
    #[serde(serialize_with = "serialize_utc")]
    pub extracted_at: DateTime<Utc>,
    pub run_date: RunDate,
}

/// Normalized crypto quote with its USD cross-rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CryptoRow {
    pub crypto_symbol: String,
    pub currency: String,
    pub price: f64,
    pub price_usd: f64,
    pub rate_date: NaiveDate,
    pub source: String,
    #[serde(serialize_with = "serialize_utc")]
    pub extracted_at: DateTime<Utc>,
    pub run_date: RunDate,
}

/// Annual inflation figure for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationRow {
    pub country_code: String,
    pub country_name: String,
    /// Percent; may be negative.
    pub inflation_rate: f64,
    pub year: i32,
    pub source: String,
    #[serde(serialize_with = "serialize_utc")]
    pub extracted_at: DateTime<Utc>,
    pub run_date: RunDate,
}

/// A remote-job listing after raw normalization. Not a report row itself;
/// the jobs reports are derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRow {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub candidate_required_location: Option<String>,
    /// Free text, e.g. "$80,000 - $100,000".
    pub salary: Option<String>,
    pub publication_date: Option<String>,
    pub url: Option<String>,
    pub extracted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFrequencyRow {
    pub skill: String,
    pub count: usize,
    pub run_date: RunDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCountRow {
    pub country: String,
    pub total_jobs: usize,
    pub run_date: RunDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyJobCountRow {
    pub day: NaiveDate,
    pub total_jobs: usize,
    pub run_date: RunDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryMetricRow {
    pub metric: String,
    pub value: f64,
    pub run_date: RunDate,
}

macro_rules! impl_report_row {
    ($($ty:ty),* $(,)?) => {
        $(impl ReportRow for $ty {
            fn run_date(&self) -> RunDate {
                self.run_date
            }
        })*
    };
}

impl_report_row!(
    ForexRow,
    CryptoRow,
    InflationRow,
    SkillFrequencyRow,
    CountryCountRow,
    DailyJobCountRow,
    SalaryMetricRow,
);

/// RFC 3339 with an explicit `+00:00` offset.
fn serialize_utc<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false))
}
