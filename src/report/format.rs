//! Terminal output for the pipeline commands.

use crate::app::pipeline::{FetchedSnapshot, ProcessedDomain, ReportStatus, TableStatus};
use crate::domain::{Domain, ReportKind};
use crate::error::Result;

/// Summary of a `fetch` invocation, one line per domain.
pub fn format_fetch_summary(results: &[(Domain, Result<FetchedSnapshot>)]) -> String {
    let mut out = String::new();
    out.push_str("=== pulse - fetch ===\n");
    for (domain, result) in results {
        match result {
            Ok(snap) => out.push_str(&format!(
                "{:<10} {:>5} records -> {}\n",
                domain.as_str(),
                snap.records,
                snap.path.display()
            )),
            Err(e) => out.push_str(&format!("{:<10} FAILED: {e}\n", domain.as_str())),
        }
    }
    out
}

/// Summary of a `process` invocation: per domain, the outcome of every report.
pub fn format_process_summary(results: &[(Domain, Result<ProcessedDomain>)]) -> String {
    let mut out = String::new();
    out.push_str("=== pulse - process ===\n");
    for (domain, result) in results {
        match result {
            Ok(done) => {
                out.push_str(&format!(
                    "{} (run_date={}, {} records from {})\n",
                    domain.as_str(),
                    done.run_date,
                    done.records,
                    done.origin
                ));
                for r in &done.reports {
                    let detail = match r.status {
                        ReportStatus::Merged(outcome) => {
                            format!("{:<6} {}", outcome.label(), outcome_rows(outcome))
                        }
                        ReportStatus::Empty => "EMPTY  no rows derived".to_string(),
                    };
                    out.push_str(&format!("  {:<36} {detail}\n", r.report.table_name()));
                }
            }
            Err(e) => out.push_str(&format!("{} FAILED: {e}\n", domain.as_str())),
        }
    }
    out
}

fn outcome_rows(outcome: crate::store::MergeOutcome) -> String {
    use crate::store::MergeOutcome;
    match outcome {
        MergeOutcome::Created { rows } => format!("+{rows} rows"),
        MergeOutcome::Appended { rows, total } => format!("+{rows} rows (total {total})"),
        MergeOutcome::Skipped => "run date already present".to_string(),
    }
}

/// Table of row counts and run-date ranges for every report.
pub fn format_status(statuses: &[(ReportKind, Option<TableStatus>)]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<36} {:>7} {:>6} {:<10} {:<10}\n",
            "table", "rows", "runs", "first", "last"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<36} {:-<7} {:-<6} {:-<10} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for (report, status) in statuses {
        let line = match status {
            Some(s) => {
                let first = s.run_dates.first().map(|d| d.to_string()).unwrap_or_default();
                let last = s.run_dates.last().map(|d| d.to_string()).unwrap_or_default();
                format!(
                    "{:<36} {:>7} {:>6} {:<10} {:<10}",
                    report.table_name(),
                    s.rows,
                    s.run_dates.len(),
                    first,
                    last
                )
            }
            None => format!("{:<36} {:>7}", report.table_name(), "-"),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::ReportResult;
    use crate::domain::RunDate;
    use crate::error::AppError;
    use crate::store::MergeOutcome;
    use std::collections::BTreeSet;

    #[test]
    fn process_summary_lists_each_report() {
        let run_date = RunDate::parse("2025-05-02").unwrap();
        let results = vec![
            (
                Domain::Jobs,
                Ok(ProcessedDomain {
                    domain: Domain::Jobs,
                    run_date,
                    origin: "raw_jobs_2025_05_02.csv".to_string(),
                    records: 12,
                    reports: vec![
                        ReportResult {
                            report: ReportKind::SkillsDemanded,
                            status: ReportStatus::Merged(MergeOutcome::Created { rows: 5 }),
                        },
                        ReportResult {
                            report: ReportKind::AverageSalaries,
                            status: ReportStatus::Empty,
                        },
                    ],
                }),
            ),
            (Domain::Crypto, Err(AppError::NotFound("no raw_crypto_ file".to_string()))),
        ];

        let out = format_process_summary(&results);
        assert!(out.contains("jobs (run_date=2025-05-02, 12 records"));
        assert!(out.contains("jobs/skills_demanded_daily"));
        assert!(out.contains("CREATE +5 rows"));
        assert!(out.contains("EMPTY"));
        assert!(out.contains("crypto FAILED"));
    }

    #[test]
    fn status_shows_first_and_last_run_dates() {
        let run_dates: BTreeSet<RunDate> = ["2025-05-01", "2025-05-03"]
            .iter()
            .map(|s| RunDate::parse(s).unwrap())
            .collect();
        let statuses = vec![
            (
                ReportKind::ForexDaily,
                Some(TableStatus {
                    report: ReportKind::ForexDaily,
                    rows: 12,
                    run_dates,
                }),
            ),
            (ReportKind::CryptoDaily, None),
        ];

        let out = format_status(&statuses);
        let forex = out.lines().find(|l| l.starts_with("economy/forex_daily")).unwrap();
        assert!(forex.contains("2025-05-01"));
        assert!(forex.contains("2025-05-03"));
        let crypto = out.lines().find(|l| l.starts_with("economy/crypto_daily")).unwrap();
        assert!(crypto.ends_with('-'));
    }
}
