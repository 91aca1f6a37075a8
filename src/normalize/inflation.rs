//! Inflation: World Bank indicator payloads -> raw records -> `InflationRow`s.
//!
//! A country with no datapoint yet (empty list or null value) is skipped with
//! a warning; it never aborts the other countries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::warn;

use crate::config::{Country, InflationConfig};
use crate::domain::{Domain, InflationRow, RawRecord, RawValue, RunDate};
use crate::error::{AppError, Result};
use crate::normalize::{ensure_fields, required_f64, required_text, required_timestamp};

const REQUIRED: [&str; 6] = ["country_code", "country_name", "inflation_rate", "year", "source", "extracted_at"];

/// Flatten one country's `[metadata, datapoints]` response.
///
/// Returns `Ok(None)` when the provider has no value for the queried period.
pub fn record_from_world_bank(
    payload: &Value,
    country: &Country,
    config: &InflationConfig,
    extracted_at: DateTime<Utc>,
) -> Result<Option<RawRecord>> {
    let parts = payload.as_array().ok_or_else(|| {
        AppError::Schema(format!(
            "world bank payload for {} is not a [metadata, data] array",
            country.code
        ))
    })?;

    let first = parts
        .get(1)
        .and_then(Value::as_array)
        .and_then(|points| points.first());

    let Some(point) = first.filter(|p| !p.get("value").is_none_or(Value::is_null)) else {
        warn!(country = %country.name, code = %country.code, "No inflation data for country, skipping");
        return Ok(None);
    };

    Ok(Some(
        RawRecord::new()
            .with("country_code", country.code.as_str())
            .with("country_name", country.name.as_str())
            .with("inflation_rate", RawValue::from_json(&point["value"]))
            .with("year", point.get("date").map_or(RawValue::Null, RawValue::from_json))
            .with("source", config.source.as_str())
            .with("extracted_at", extracted_at.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
    ))
}

/// Flatten payloads for every configured country, skipping those without data.
pub fn records_from_world_bank<'a>(
    payloads: impl IntoIterator<Item = (&'a Country, &'a Value)>,
    config: &InflationConfig,
    extracted_at: DateTime<Utc>,
) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (country, payload) in payloads {
        if let Some(record) = record_from_world_bank(payload, country, config, extracted_at)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Validate and coerce raw inflation records.
pub fn normalize(records: &[RawRecord], run_date: RunDate) -> Result<Vec<InflationRow>> {
    let domain = Domain::Inflation;
    ensure_fields(domain, records, &REQUIRED)?;

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Ok(InflationRow {
                country_code: required_text(domain, idx, record, "country_code")?,
                country_name: required_text(domain, idx, record, "country_name")?,
                inflation_rate: required_f64(domain, idx, record, "inflation_rate")?,
                year: parse_year(idx, record)?,
                source: required_text(domain, idx, record, "source")?,
                extracted_at: required_timestamp(domain, idx, record, "extracted_at")?,
                run_date,
            })
        })
        .collect()
}

/// `"2023"` and `2023.0` are both accepted; `2023.5` is not.
fn parse_year(idx: usize, record: &RawRecord) -> Result<i32> {
    let y = required_f64(Domain::Inflation, idx, record, "year")?;
    if y.fract() != 0.0 || y < f64::from(i32::MIN) || y > f64::from(i32::MAX) {
        return Err(AppError::Schema(format!(
            "inflation record {}: invalid `year`: {y} is not an integer year",
            idx + 1
        )));
    }
    Ok(y as i32)
}
