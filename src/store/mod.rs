//! Append-only, run-date-partitioned report tables.
//!
//! `ReportStore` is the storage seam (a directory of CSV files in production,
//! a map in tests). The merge contract lives in `merge_run_date` and is the
//! same for every backend:
//!
//! - no table yet: create it with exactly the incoming rows
//! - table already holds the run date: no-op, the whole batch is discarded
//! - otherwise: persist existing rows followed by the incoming rows
//!
//! Each run date therefore appears as one contiguous block written once.

pub mod csv_dir;
pub mod memory;
pub mod table;

pub use csv_dir::CsvDirStore;
pub use memory::MemoryStore;
pub use table::{RUN_DATE_COLUMN, Table};

use tracing::info;

use crate::domain::{ReportRow, RunDate};
use crate::error::{AppError, Result};

/// What a merge did to the persisted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The table did not exist and now holds `rows` rows.
    Created { rows: usize },
    /// `rows` rows were appended; the table now holds `total`.
    Appended { rows: usize, total: usize },
    /// The run date was already present; nothing was written.
    Skipped,
}

impl MergeOutcome {
    pub fn label(self) -> &'static str {
        match self {
            MergeOutcome::Created { .. } => "CREATE",
            MergeOutcome::Appended { .. } => "UPDATE",
            MergeOutcome::Skipped => "SKIP",
        }
    }
}

/// Persistence backend for report tables.
pub trait ReportStore {
    /// Full contents of `table`, or `None` when it has never been written.
    fn load(&self, table: &str) -> Result<Option<Table>>;

    /// Replace the contents of `table`.
    fn save(&self, table: &str, contents: &Table) -> Result<()>;

    /// Run `f` while holding exclusive write access to `table`.
    fn with_exclusive<T>(&self, table: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _ = table;
        f()
    }

    fn merge_run_date<R: ReportRow>(&self, table: &str, rows: &[R], run_date: RunDate) -> Result<MergeOutcome>
    where
        Self: Sized,
    {
        merge_run_date(self, table, rows, run_date)
    }
}

/// Merge one run date's rows into `table` (see module docs).
///
/// `rows` must be non-empty and every row must carry `run_date`; otherwise
/// `InvariantViolation` is returned and nothing is read or written.
pub fn merge_run_date<S: ReportStore, R: ReportRow>(
    store: &S,
    table: &str,
    rows: &[R],
    run_date: RunDate,
) -> Result<MergeOutcome> {
    if rows.is_empty() {
        return Err(AppError::InvariantViolation(format!(
            "merge into {table} called with an empty batch for {run_date}"
        )));
    }
    if let Some(other) = rows.iter().map(ReportRow::run_date).find(|d| *d != run_date) {
        return Err(AppError::InvariantViolation(format!(
            "merge into {table} for {run_date} contains a row for {other}"
        )));
    }

    let incoming = Table::from_rows(rows)?;

    store.with_exclusive(table, || {
        let Some(mut existing) = store.load(table)? else {
            store.save(table, &incoming)?;
            info!(table, %run_date, rows = incoming.rows.len(), "[CREATE] Created report table");
            return Ok(MergeOutcome::Created {
                rows: incoming.rows.len(),
            });
        };

        if !existing.same_columns(&incoming) {
            return Err(AppError::Schema(format!(
                "report table {table} has columns [{}] but the new rows have [{}]",
                existing.header.iter().collect::<Vec<_>>().join(","),
                incoming.header.iter().collect::<Vec<_>>().join(","),
            )));
        }

        if existing.contains_run_date(run_date)? {
            info!(table, %run_date, "[SKIP] Report already has data for run date");
            return Ok(MergeOutcome::Skipped);
        }

        let appended = incoming.rows.len();
        existing.rows.extend(incoming.rows.iter().cloned());
        store.save(table, &existing)?;
        info!(table, %run_date, rows = appended, total = existing.rows.len(), "[UPDATE] Appended daily data");

        Ok(MergeOutcome::Appended {
            rows: appended,
            total: existing.rows.len(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryCountRow, SkillFrequencyRow};

    fn day(s: &str) -> RunDate {
        RunDate::parse(s).unwrap()
    }

    fn skills(run_date: RunDate, names: &[(&str, usize)]) -> Vec<SkillFrequencyRow> {
        names
            .iter()
            .map(|(skill, count)| SkillFrequencyRow {
                skill: skill.to_string(),
                count: *count,
                run_date,
            })
            .collect()
    }

    const TABLE: &str = "jobs/skills_demanded_daily";

    #[test]
    fn first_merge_creates_table() {
        let store = MemoryStore::new();
        let d = day("2025-05-01");
        let outcome = store.merge_run_date(TABLE, &skills(d, &[("rust", 3), ("go", 1)]), d).unwrap();
        assert_eq!(outcome, MergeOutcome::Created { rows: 2 });
        assert_eq!(store.table(TABLE).unwrap().rows.len(), 2);
    }

    #[test]
    fn merging_same_run_date_twice_is_idempotent() {
        let store = MemoryStore::new();
        let d = day("2025-05-01");
        let rows = skills(d, &[("rust", 3), ("go", 1)]);

        store.merge_run_date(TABLE, &rows, d).unwrap();
        let once = store.table(TABLE).unwrap();
        let outcome = store.merge_run_date(TABLE, &rows, d).unwrap();

        assert_eq!(outcome, MergeOutcome::Skipped);
        assert_eq!(store.table(TABLE).unwrap(), once);
    }

    #[test]
    fn collision_discards_whole_batch_even_with_new_rows() {
        let store = MemoryStore::new();
        let d = day("2025-05-01");
        store.merge_run_date(TABLE, &skills(d, &[("rust", 3)]), d).unwrap();

        let corrected = skills(d, &[("rust", 4), ("python", 2)]);
        assert_eq!(store.merge_run_date(TABLE, &corrected, d).unwrap(), MergeOutcome::Skipped);
        assert_eq!(store.table(TABLE).unwrap().rows.len(), 1);
    }

    #[test]
    fn new_run_date_appends_contiguous_block() {
        let store = MemoryStore::new();
        let d1 = day("2025-05-01");
        let d2 = day("2025-05-02");
        store.merge_run_date(TABLE, &skills(d1, &[("rust", 3), ("go", 1)]), d1).unwrap();
        let outcome = store
            .merge_run_date(TABLE, &skills(d2, &[("python", 5), ("sql", 2), ("aws", 1)]), d2)
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Appended { rows: 3, total: 5 });

        let table = store.table(TABLE).unwrap();
        let idx = table.run_date_index().unwrap();
        let dates: Vec<&str> = table.rows.iter().map(|r| r.get(idx).unwrap()).collect();
        assert_eq!(dates, vec!["2025-05-01", "2025-05-01", "2025-05-02", "2025-05-02", "2025-05-02"]);
        assert_eq!(&table.rows[0][0], "rust");
    }

    #[test]
    fn empty_batch_is_invariant_violation() {
        let store = MemoryStore::new();
        let rows: Vec<SkillFrequencyRow> = Vec::new();
        let err = store.merge_run_date(TABLE, &rows, day("2025-05-01")).unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
        assert!(store.table(TABLE).is_none());
    }

    #[test]
    fn mixed_run_dates_are_invariant_violation() {
        let store = MemoryStore::new();
        let mut rows = skills(day("2025-05-01"), &[("rust", 3)]);
        rows.extend(skills(day("2025-05-02"), &[("go", 1)]));
        let err = store.merge_run_date(TABLE, &rows, day("2025-05-01")).unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[test]
    fn header_mismatch_leaves_table_untouched() {
        let store = MemoryStore::new();
        let d1 = day("2025-05-01");
        store.merge_run_date(TABLE, &skills(d1, &[("rust", 3)]), d1).unwrap();
        let before = store.table(TABLE).unwrap();

        let d2 = day("2025-05-02");
        let other = [CountryCountRow {
            country: "USA".to_string(),
            total_jobs: 4,
            run_date: d2,
        }];
        let err = store.merge_run_date(TABLE, &other, d2).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
        assert_eq!(store.table(TABLE).unwrap(), before);
    }

    #[test]
    fn legacy_underscore_run_dates_still_deduplicate() {
        let store = MemoryStore::new();
        let legacy = Table::read_from("skill,count,run_date\nrust,3,2025_05_01\n".as_bytes()).unwrap();
        store.save(TABLE, &legacy).unwrap();

        let d = day("2025-05-01");
        assert_eq!(
            store.merge_run_date(TABLE, &skills(d, &[("rust", 3)]), d).unwrap(),
            MergeOutcome::Skipped
        );
    }
}
