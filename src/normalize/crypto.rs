//! Crypto: CoinGecko simple-price payload -> raw records -> `CryptoRow`s.
//!
//! `price_usd` is a cross-rate against the reference-currency quote of the
//! same snapshot: `price_usd = price / reference_price`, and the reference row
//! keeps `price_usd = price`. This assumes every quote is a linear multiple of
//! one reference captured at the same instant, which only holds approximately
//! for volatile assets. The approximation is intentional.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::config::CryptoConfig;
use crate::domain::{CryptoRow, Domain, RawRecord, RawValue, RunDate};
use crate::error::{AppError, Result};
use crate::normalize::{ensure_fields, required_date, required_positive, required_text, required_timestamp};

const REQUIRED: [&str; 6] = ["base_currency", "target_currency", "rate", "rate_date", "source", "extracted_at"];

/// Flatten a simple-price response: `{"bitcoin": {"usd": 50000, "eur": 46000}}`.
///
/// The asset is looked up by provider id first, then by symbol.
pub fn records_from_coingecko(
    payload: &Value,
    config: &CryptoConfig,
    rate_date: NaiveDate,
    extracted_at: DateTime<Utc>,
) -> Result<Vec<RawRecord>> {
    let quotes = payload
        .get(&config.coin_id)
        .or_else(|| payload.get(&config.symbol))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            AppError::Schema(format!(
                "coingecko payload has no quotes for `{}` ({})",
                config.coin_id, config.symbol
            ))
        })?;

    let rate_date = rate_date.to_string();
    let extracted_at = extracted_at.to_rfc3339_opts(SecondsFormat::AutoSi, false);

    Ok(quotes
        .iter()
        .map(|(currency, price)| {
            RawRecord::new()
                .with("base_currency", config.symbol.as_str())
                .with("target_currency", currency.to_uppercase())
                .with("rate", RawValue::from_json(price))
                .with("rate_date", rate_date.as_str())
                .with("source", config.source.as_str())
                .with("extracted_at", extracted_at.as_str())
        })
        .collect())
}

/// Validate raw crypto records and derive `price_usd`.
///
/// Fails with `MissingReference` when no row is quoted in
/// `config.reference_currency`.
pub fn normalize(records: &[RawRecord], config: &CryptoConfig, run_date: RunDate) -> Result<Vec<CryptoRow>> {
    let domain = Domain::Crypto;
    ensure_fields(domain, records, &REQUIRED)?;

    let mut rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Ok(CryptoRow {
                crypto_symbol: required_text(domain, idx, record, "base_currency")?,
                currency: required_text(domain, idx, record, "target_currency")?,
                price: required_positive(domain, idx, record, "rate")?,
                price_usd: f64::NAN,
                rate_date: required_date(domain, idx, record, "rate_date")?,
                source: required_text(domain, idx, record, "source")?,
                extracted_at: required_timestamp(domain, idx, record, "extracted_at")?,
                run_date,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let is_reference = |row: &CryptoRow| row.currency.eq_ignore_ascii_case(&config.reference_currency);

    let reference_price = rows
        .iter()
        .find(|row| is_reference(row))
        .map(|row| row.price)
        .ok_or_else(|| AppError::MissingReference {
            symbol: rows
                .first()
                .map_or_else(|| config.symbol.clone(), |r| r.crypto_symbol.clone()),
            currency: config.reference_currency.clone(),
        })?;

    for row in &mut rows {
        row.price_usd = if is_reference(row) {
            row.price
        } else {
            row.price / reference_price
        };
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn run_date() -> RunDate {
        RunDate::parse("2025_05_02").unwrap()
    }

    fn raw(currency: &str, price: f64) -> RawRecord {
        RawRecord::new()
            .with("base_currency", "BTC")
            .with("target_currency", currency)
            .with("rate", price)
            .with("rate_date", "2025-05-02")
            .with("source", "coingecko")
            .with("extracted_at", "2025-05-02 09:00:00.000000+00:00")
    }

    fn by_currency<'a>(rows: &'a [CryptoRow], currency: &str) -> &'a CryptoRow {
        rows.iter().find(|r| r.currency == currency).unwrap()
    }

    #[test]
    fn cross_rate_divides_by_reference() {
        let p = 64_000.0;
        let q = 320_000.0;
        let rows = normalize(&[raw("BRL", q), raw("USD", p)], &CryptoConfig::default(), run_date()).unwrap();

        assert_eq!(by_currency(&rows, "USD").price_usd, p);
        assert!((by_currency(&rows, "BRL").price_usd - q / p).abs() < 1e-12);
        // Input order is preserved.
        assert_eq!(rows[0].currency, "BRL");
    }

    #[test]
    fn missing_reference_row_is_fatal() {
        let err = normalize(&[raw("EUR", 46_000.0)], &CryptoConfig::default(), run_date()).unwrap_err();
        assert!(matches!(err, AppError::MissingReference { .. }));
    }

    #[test]
    fn reference_currency_is_configurable() {
        let config = CryptoConfig {
            reference_currency: "EUR".to_string(),
            ..CryptoConfig::default()
        };
        let rows = normalize(&[raw("EUR", 40_000.0), raw("USD", 50_000.0)], &config, run_date()).unwrap();
        assert_eq!(by_currency(&rows, "EUR").price_usd, 40_000.0);
        assert!((by_currency(&rows, "USD").price_usd - 1.25).abs() < 1e-12);
    }

    #[test]
    fn snapshot_to_rows() {
        let payload = json!({"BTC": {"usd": 50000, "eur": 46000}});
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap();
        let config = CryptoConfig::default();
        let records =
            records_from_coingecko(&payload, &config, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(), now).unwrap();
        let rows = normalize(&records, &config, run_date()).unwrap();

        assert_eq!(rows.len(), 2);
        let usd = by_currency(&rows, "USD");
        let eur = by_currency(&rows, "EUR");
        assert_eq!((usd.price, usd.price_usd), (50_000.0, 50_000.0));
        assert_eq!(eur.price, 46_000.0);
        assert!((eur.price_usd - 0.92).abs() < 1e-12);
        assert_eq!(eur.crypto_symbol, "BTC");
    }

    #[test]
    fn unknown_asset_is_schema_error() {
        let payload = json!({"ethereum": {"usd": 3000}});
        let err = records_from_coingecko(
            &payload,
            &CryptoConfig::default(),
            NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }
}
