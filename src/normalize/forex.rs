//! Forex: currencyapi payload -> raw records -> `ForexRow`s.
//!
//! Rates are taken as-is from the provider; no cross-currency derivation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::config::ForexConfig;
use crate::domain::{Domain, ForexRow, RawRecord, RawValue, RunDate};
use crate::error::{AppError, Result};
use crate::normalize::{ensure_fields, required_date, required_positive, required_text, required_timestamp};

const REQUIRED: [&str; 6] = ["base_currency", "target_currency", "rate", "rate_date", "source", "extracted_at"];

/// Flatten a currencyapi `latest` response.
///
/// Expected shape: `{"meta": {"last_updated_at": "..."}, "data": {"EUR": {"code": "EUR", "value": 0.92}}}`.
pub fn records_from_currencyapi(
    payload: &Value,
    config: &ForexConfig,
    extracted_at: DateTime<Utc>,
) -> Result<Vec<RawRecord>> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::Schema("currencyapi payload has no `data` object".to_string()))?;

    // `last_updated_at` is a full timestamp; keep the date part.
    let rate_date: String = payload
        .pointer("/meta/last_updated_at")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .take(10)
        .collect();

    let extracted_at = extracted_at.to_rfc3339_opts(SecondsFormat::AutoSi, false);
    let records = data
        .iter()
        .map(|(currency, quote)| {
            RawRecord::new()
                .with("base_currency", config.base_currency.as_str())
                .with("target_currency", currency.as_str())
                .with("rate", quote.get("value").map_or(RawValue::Null, RawValue::from_json))
                .with("rate_date", rate_date.as_str())
                .with("source", config.source.as_str())
                .with("extracted_at", extracted_at.as_str())
        })
        .collect();

    Ok(records)
}

/// Validate and coerce raw forex records.
pub fn normalize(records: &[RawRecord], run_date: RunDate) -> Result<Vec<ForexRow>> {
    let domain = Domain::Forex;
    ensure_fields(domain, records, &REQUIRED)?;

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Ok(ForexRow {
                base_currency: required_text(domain, idx, record, "base_currency")?,
                target_currency: required_text(domain, idx, record, "target_currency")?,
                rate: required_positive(domain, idx, record, "rate")?,
                rate_date: required_date(domain, idx, record, "rate_date")?,
                source: required_text(domain, idx, record, "source")?,
                extracted_at: required_timestamp(domain, idx, record, "extracted_at")?,
                run_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn run_date() -> RunDate {
        RunDate::parse("2025-05-02").unwrap()
    }

    fn raw(target: &str, rate: impl Into<RawValue>) -> RawRecord {
        RawRecord::new()
            .with("base_currency", "USD")
            .with("target_currency", target)
            .with("rate", rate)
            .with("rate_date", "2025-05-02")
            .with("source", "currencyapi")
            .with("extracted_at", "2025-05-02T09:00:00+00:00")
    }

    #[test]
    fn normalizes_rates_as_is() {
        let rows = normalize(&[raw("EUR", "0.91"), raw("ARS", 1150.5)], run_date()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target_currency, "EUR");
        assert!((rows[0].rate - 0.91).abs() < 1e-12);
        assert!((rows[1].rate - 1150.5).abs() < 1e-12);
        assert_eq!(rows[1].rate_date, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        assert!(rows.iter().all(|r| r.run_date == run_date()));
    }

    #[test]
    fn non_numeric_rate_is_schema_error() {
        let err = normalize(&[raw("EUR", "n/a")], run_date()).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[test]
    fn missing_column_fails_before_coercion() {
        let record = RawRecord::new().with("base_currency", "USD").with("rate", "1.0");
        let err = normalize(&[record], run_date()).unwrap_err();
        assert!(err.to_string().contains("target_currency"));
    }

    #[test]
    fn flattens_currencyapi_payload() {
        let payload = json!({
            "meta": {"last_updated_at": "2025-05-01T23:59:59Z"},
            "data": {
                "EUR": {"code": "EUR", "value": 0.9},
                "MXN": {"code": "MXN", "value": 19.6}
            }
        });
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap();
        let records = records_from_currencyapi(&payload, &ForexConfig::default(), now).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("rate_date").as_deref(), Some("2025-05-01"));
        assert_eq!(records[1].number("rate"), Some(19.6));

        let rows = normalize(&records, run_date()).unwrap();
        assert_eq!(rows[0].extracted_at, now);
    }
}
