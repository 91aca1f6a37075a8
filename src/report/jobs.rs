//! Daily jobs reports: listings per country, publications per day, average salary.
//!
//! Entities that cannot be interpreted (an unparseable publication date, a
//! salary without digits) are dropped from the metric; they never fail the run.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::domain::{CountryCountRow, DailyJobCountRow, JobRow, RunDate, SalaryMetricRow, parse_timestamp};

/// ASCII digit runs only; other scripts' digits are ignored.
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("static pattern"));

/// Label used when a listing has no required location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Listing count per `candidate_required_location`, most common first.
///
/// Equal counts keep first-appearance order.
pub fn jobs_by_country(jobs: &[JobRow], run_date: RunDate) -> Vec<CountryCountRow> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for job in jobs {
        let country = job
            .candidate_required_location
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_LOCATION);
        *counts.entry(country).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .map(|(country, total_jobs)| CountryCountRow {
            country: country.to_string(),
            total_jobs,
            run_date,
        })
        .collect()
}

/// Listings per publication day (UTC), ascending by day.
pub fn job_growth_daily(jobs: &[JobRow], run_date: RunDate) -> Vec<DailyJobCountRow> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut dropped = 0usize;

    for job in jobs {
        match job.publication_date.as_deref().and_then(parse_timestamp) {
            Some(ts) => *per_day.entry(ts.date_naive()).or_insert(0) += 1,
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "Listings without a valid publication date");
    }

    per_day
        .into_iter()
        .map(|(day, total_jobs)| DailyJobCountRow { day, total_jobs, run_date })
        .collect()
}

/// Mean of the integers found in one free-text salary (`,` separators removed).
pub fn salary_value(salary: &str) -> Option<f64> {
    let cleaned = salary.replace(',', "");
    let values: Vec<f64> = INTEGER
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Average of per-listing salary values.
///
/// Empty when no listing yields a number.
pub fn average_salaries(jobs: &[JobRow], run_date: RunDate) -> Vec<SalaryMetricRow> {
    let values: Vec<f64> = jobs
        .iter()
        .filter_map(|job| job.salary.as_deref())
        .filter_map(salary_value)
        .collect();

    if values.is_empty() {
        return Vec::new();
    }

    vec![SalaryMetricRow {
        metric: "average_salary".to_string(),
        value: values.iter().sum::<f64>() / values.len() as f64,
        run_date,
    }]
}
