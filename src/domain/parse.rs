//! Lenient date/time parsing for provider values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a calendar date. A datetime string is truncated to its date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y_%m_%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    parse_timestamp(s).map(|ts| ts.date_naive())
}

/// Parse a timestamp and convert it to UTC.
///
/// Offset-aware inputs are converted; naive datetimes and bare dates are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    // pandas writes `2025-01-02 03:04:05.123456+00:00`.
    const OFFSET_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];
    for fmt in OFFSET_FMTS {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    const NAIVE_FMTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for fmt in NAIVE_FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
