//! Jobs: Remotive listing payload -> raw records -> `JobRow`s.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::warn;

use crate::domain::{Domain, JobRow, RawRecord, RawValue, parse_timestamp};
use crate::error::Result;
use crate::normalize::ensure_fields;

/// Raw columns the jobs reports read. Values may be null; the columns must exist.
const REQUIRED: [&str; 5] = ["title", "category", "candidate_required_location", "salary", "publication_date"];

/// Provider field -> raw column.
const FIELD_MAP: [(&str, &str); 9] = [
    ("id", "job_id"),
    ("title", "title"),
    ("company_name", "company"),
    ("category", "category"),
    ("job_type", "job_type"),
    ("candidate_required_location", "candidate_required_location"),
    ("salary", "salary"),
    ("publication_date", "publication_date"),
    ("url", "url"),
];

/// Flatten a Remotive `remote-jobs` response (`{"jobs": [...]}`).
pub fn records_from_remotive(payload: &Value, extracted_at: DateTime<Utc>) -> Vec<RawRecord> {
    let Some(jobs) = payload.get("jobs").and_then(Value::as_array) else {
        warn!("Remotive payload has no `jobs` array; treating as empty");
        return Vec::new();
    };

    let extracted_at = extracted_at.to_rfc3339_opts(SecondsFormat::AutoSi, false);
    jobs.iter()
        .map(|job| {
            let mut record = RawRecord::new();
            for (field, column) in FIELD_MAP {
                record.insert(column, job.get(field).map_or(RawValue::Null, RawValue::from_json));
            }
            record.insert("extracted_at", extracted_at.as_str());
            record
        })
        .collect()
}

/// Validate raw job records and lift them into `JobRow`s.
pub fn normalize(records: &[RawRecord]) -> Result<Vec<JobRow>> {
    ensure_fields(Domain::Jobs, records, &REQUIRED)?;

    Ok(records
        .iter()
        .map(|r| JobRow {
            job_id: r.text("job_id"),
            title: r.text("title"),
            company: r.text("company"),
            category: r.text("category"),
            job_type: r.text("job_type"),
            candidate_required_location: r.text("candidate_required_location"),
            salary: r.text("salary"),
            publication_date: r.text("publication_date"),
            url: r.text("url"),
            extracted_at: r.text("extracted_at").as_deref().and_then(parse_timestamp),
        })
        .collect())
}
