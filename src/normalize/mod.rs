//! Per-domain normalizers.
//!
//! Each domain module has two halves:
//! - `records_from_*`: flatten a decoded provider payload into `RawRecord`s
//!   (what the fetch stage writes as a raw snapshot)
//! - `normalize`: validate the raw schema, coerce types and derive values,
//!   producing canonical report rows stamped with the run date
//!
//! Schema validation always runs before any derivation so a malformed snapshot
//! fails with a `Schema` error naming the record and field.

pub mod crypto;
pub mod forex;
pub mod inflation;
pub mod jobs;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Domain, RawRecord, parse_date, parse_timestamp};
use crate::error::{AppError, Result};

/// Every record must carry every field in `fields` (values may still be null).
pub(crate) fn ensure_fields(domain: Domain, records: &[RawRecord], fields: &[&str]) -> Result<()> {
    for (idx, record) in records.iter().enumerate() {
        if let Some(missing) = fields.iter().find(|f| !record.contains(f)) {
            return Err(AppError::Schema(format!(
                "{domain} record {} is missing field `{missing}`",
                idx + 1
            )));
        }
    }
    Ok(())
}

pub(crate) fn required_text(domain: Domain, idx: usize, record: &RawRecord, field: &str) -> Result<String> {
    record
        .text(field)
        .ok_or_else(|| schema_error(domain, idx, field, "value is missing"))
}

pub(crate) fn required_f64(domain: Domain, idx: usize, record: &RawRecord, field: &str) -> Result<f64> {
    record.number(field).ok_or_else(|| {
        let shown = record.get(field).map(|v| v.to_cell()).unwrap_or_default();
        schema_error(domain, idx, field, &format!("'{shown}' is not numeric"))
    })
}

/// Numeric and strictly positive.
pub(crate) fn required_positive(domain: Domain, idx: usize, record: &RawRecord, field: &str) -> Result<f64> {
    let v = required_f64(domain, idx, record, field)?;
    if v <= 0.0 {
        return Err(schema_error(domain, idx, field, &format!("{v} is not positive")));
    }
    Ok(v)
}

pub(crate) fn required_date(domain: Domain, idx: usize, record: &RawRecord, field: &str) -> Result<NaiveDate> {
    let s = required_text(domain, idx, record, field)?;
    parse_date(&s).ok_or_else(|| schema_error(domain, idx, field, &format!("'{s}' is not a date")))
}

pub(crate) fn required_timestamp(
    domain: Domain,
    idx: usize,
    record: &RawRecord,
    field: &str,
) -> Result<DateTime<Utc>> {
    let s = required_text(domain, idx, record, field)?;
    parse_timestamp(&s).ok_or_else(|| schema_error(domain, idx, field, &format!("'{s}' is not a timestamp")))
}

fn schema_error(domain: Domain, idx: usize, field: &str, detail: &str) -> AppError {
    AppError::Schema(format!("{domain} record {}: invalid `{field}`: {detail}", idx + 1))
}
