//! Raw snapshot files: `raw_<domain>_YYYY_MM_DD.csv` under one directory.
//!
//! The fetch stage writes one file per domain per day; the process stage picks
//! the latest file for a domain (file names sort by date) and derives the run
//! date from its name.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Domain, RawRecord, RawValue, RunDate};
use crate::error::{AppError, Result};

/// One domain's raw dataset plus the run date it represents.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub domain: Domain,
    pub run_date: RunDate,
    pub records: Vec<RawRecord>,
    /// Where the snapshot came from (a file path for `RawDir`).
    pub origin: String,
}

/// Supplies the most recent raw snapshot for a domain.
pub trait RawSnapshotSource {
    fn load_latest(&self, domain: Domain) -> Result<RawSnapshot>;
}

/// A directory of raw snapshot CSV files.
#[derive(Debug, Clone)]
pub struct RawDir {
    root: PathBuf,
}

impl RawDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, domain: Domain, run_date: RunDate) -> PathBuf {
        self.root
            .join(format!("{}{}.csv", domain.raw_prefix(), run_date.file_stamp()))
    }

    /// Latest `raw_<domain>_*.csv` by file name.
    pub fn latest_file(&self, domain: Domain) -> Result<PathBuf> {
        let prefix = domain.raw_prefix();
        let entries = fs::read_dir(&self.root).map_err(|e| {
            AppError::NotFound(format!("Raw directory '{}' is not readable: {e}", self.root.display()))
        })?;

        let mut latest: Option<(String, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !(name.starts_with(&prefix) && name.ends_with(".csv")) {
                continue;
            }
            if latest.as_ref().is_none_or(|(best, _)| name > *best) {
                latest = Some((name, entry.path()));
            }
        }

        let (name, path) = latest.ok_or_else(|| {
            AppError::NotFound(format!(
                "No files found for pattern {prefix}*.csv in '{}'",
                self.root.display()
            ))
        })?;
        debug!(domain = %domain, file = %name, "Using raw file");
        Ok(path)
    }

    /// Write records as a raw snapshot file and return its path.
    ///
    /// The header is the union of record fields in first-seen order.
    pub fn write_snapshot(&self, domain: Domain, run_date: RunDate, records: &[RawRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::Io(format!("Failed to create raw directory '{}': {e}", self.root.display()))
        })?;
        let path = self.snapshot_path(domain, run_date);

        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(&key) {
                    columns.push(key);
                }
            }
        }

        let file = File::create(&path)
            .map_err(|e| AppError::Io(format!("Failed to create raw snapshot '{}': {e}", path.display())))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&columns)?;
        for record in records {
            let cells = columns
                .iter()
                .map(|c| record.get(c).map(RawValue::to_cell).unwrap_or_default());
            writer.write_record(cells)?;
        }
        writer.flush()?;

        info!(domain = %domain, records = records.len(), path = %path.display(), "Raw snapshot saved");
        Ok(path)
    }
}

impl RawSnapshotSource for RawDir {
    fn load_latest(&self, domain: Domain) -> Result<RawSnapshot> {
        let path = self.latest_file(domain)?;
        let run_date = run_date_from_file_name(&path, domain)?;
        let records = read_raw_csv(&path)?;
        Ok(RawSnapshot {
            domain,
            run_date,
            records,
            origin: path.display().to_string(),
        })
    }
}

/// `raw_forex_2025_05_02.csv` -> 2025-05-02.
pub fn run_date_from_file_name(path: &Path, domain: Domain) -> Result<RunDate> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = name
        .strip_prefix(&domain.raw_prefix())
        .and_then(|rest| rest.strip_suffix(".csv"))
        .ok_or_else(|| AppError::Schema(format!("'{name}' is not a raw {domain} snapshot file name")))?;
    stamp.parse()
}

/// Read a raw snapshot CSV into records. Empty cells become nulls.
pub fn read_raw_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open raw snapshot '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Schema(format!("Failed to read raw snapshot headers: {e}")))?
        .clone();
    let columns = normalize_headers(&headers);

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, CSV lines are 1-based.
        let line = idx + 2;
        let row = result.map_err(|e| {
            AppError::Schema(format!("{}: line {line}: CSV parse error: {e}", path.display()))
        })?;

        let mut record = RawRecord::new();
        for (col, name) in columns.iter().enumerate() {
            let value = match row.get(col) {
                Some(cell) if !cell.is_empty() => RawValue::Text(cell.to_string()),
                _ => RawValue::Null,
            };
            record.insert(name.as_str(), value);
        }
        records.push(record);
    }

    Ok(records)
}

fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_latest_file_and_its_run_date() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "raw_forex_2025_04_30.csv",
            "raw_forex_2025_05_02.csv",
            "raw_forex_2025_05_01.csv",
            "raw_crypto_2025_06_01.csv",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "base_currency,rate\nUSD,1\n").unwrap();
        }

        let raw = RawDir::new(dir.path());
        let snapshot = raw.load_latest(Domain::Forex).unwrap();
        assert_eq!(snapshot.run_date, RunDate::parse("2025-05-02").unwrap());
        assert!(snapshot.origin.ends_with("raw_forex_2025_05_02.csv"));
        assert_eq!(snapshot.records.len(), 1);
    }

    #[test]
    fn no_matching_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawDir::new(dir.path()).load_latest(Domain::Jobs).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn empty_cells_read_as_null_and_bom_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_jobs_2025_05_02.csv");
        fs::write(&path, "\u{feff}Title,salary\nRust Dev,\n").unwrap();

        let records = read_raw_csv(&path).unwrap();
        assert_eq!(records[0].text("title").as_deref(), Some("Rust Dev"));
        assert_eq!(records[0].get("salary"), Some(&RawValue::Null));
    }

    #[test]
    fn written_snapshot_is_found_again() {
        let dir = tempfile::tempdir().unwrap();
        let raw = RawDir::new(dir.path().join("raw"));
        let d = RunDate::parse("2025-05-02").unwrap();
        let records = vec![
            RawRecord::new().with("country_code", "ARG").with("inflation_rate", 211.4),
            RawRecord::new().with("country_code", "USA").with("year", "2023"),
        ];

        let path = raw.write_snapshot(Domain::Inflation, d, &records).unwrap();
        assert!(path.ends_with("raw_inflation_2025_05_02.csv"));

        let snapshot = raw.load_latest(Domain::Inflation).unwrap();
        assert_eq!(snapshot.run_date, d);
        assert_eq!(snapshot.records[0].number("inflation_rate"), Some(211.4));
        assert_eq!(snapshot.records[0].get("year"), Some(&RawValue::Null));
        assert_eq!(snapshot.records[1].text("year").as_deref(), Some("2023"));
    }

    #[test]
    fn file_name_must_carry_a_date() {
        let err = run_date_from_file_name(Path::new("raw_forex_latest.csv"), Domain::Forex).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }
}
