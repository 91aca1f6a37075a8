//! In-memory form of a report table: one header plus string rows.
//!
//! Working at the string level keeps stored rows byte-for-byte as written by
//! earlier runs; only the incoming batch is serialized from typed rows.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use csv::StringRecord;

use crate::domain::{ReportRow, RunDate};
use crate::error::{AppError, Result};

pub const RUN_DATE_COLUMN: &str = "run_date";

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Serialize typed rows; the header comes from the row struct's field names.
    pub fn from_rows<R: ReportRow>(rows: &[R]) -> Result<Self> {
        if rows.is_empty() {
            return Err(AppError::InvariantViolation(
                "cannot build a report table from an empty batch".to_string(),
            ));
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let buf = writer
            .into_inner()
            .map_err(|e| AppError::Io(format!("Failed to serialize report rows: {e}")))?;

        Self::read_from(buf.as_slice())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().from_reader(reader);
        let header = reader.headers()?.clone();
        if header.is_empty() {
            return Err(AppError::Schema("report table has no header row".to_string()));
        }
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { header, rows })
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn run_date_index(&self) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == RUN_DATE_COLUMN)
            .ok_or_else(|| AppError::Schema(format!("report table has no `{RUN_DATE_COLUMN}` column")))
    }

    /// True when any row belongs to `run_date`. Legacy `YYYY_MM_DD` cells match too.
    pub fn contains_run_date(&self, run_date: RunDate) -> Result<bool> {
        let idx = self.run_date_index()?;
        let wanted = run_date.to_string();
        Ok(self.rows.iter().filter_map(|row| row.get(idx)).any(|cell| {
            let cell = cell.trim();
            cell == wanted || RunDate::parse(cell) == Some(run_date)
        }))
    }

    /// Distinct run dates present, ascending. Unparseable cells are ignored.
    pub fn run_dates(&self) -> Result<BTreeSet<RunDate>> {
        let idx = self.run_date_index()?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(RunDate::parse)
            .collect())
    }

    /// Same columns in the same order (ignoring a UTF-8 BOM on the first header).
    pub fn same_columns(&self, other: &Table) -> bool {
        let clean = |h: &StringRecord| -> Vec<String> {
            h.iter().map(|c| c.trim_start_matches('\u{feff}').trim().to_string()).collect()
        };
        clean(&self.header) == clean(&other.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkillFrequencyRow;

    #[test]
    fn header_comes_from_row_fields() {
        let run_date = RunDate::parse("2025-05-02").unwrap();
        let rows = [SkillFrequencyRow {
            skill: "rust".to_string(),
            count: 3,
            run_date,
        }];
        let table = Table::from_rows(&rows).unwrap();
        assert_eq!(table.header, StringRecord::from(vec!["skill", "count", "run_date"]));
        assert_eq!(table.rows[0], StringRecord::from(vec!["rust", "3", "2025-05-02"]));
        assert!(table.contains_run_date(run_date).unwrap());
    }

    #[test]
    fn legacy_run_date_cells_are_recognized() {
        let csv = "skill,count,run_date\nrust,3,2025_05_02\ngo,1,2025_05_03\n";
        let table = Table::read_from(csv.as_bytes()).unwrap();
        assert!(table.contains_run_date(RunDate::parse("2025-05-02").unwrap()).unwrap());
        assert!(!table.contains_run_date(RunDate::parse("2025-05-04").unwrap()).unwrap());
        assert_eq!(table.run_dates().unwrap().len(), 2);
    }

    #[test]
    fn missing_run_date_column_is_schema_error() {
        let table = Table::read_from("a,b\n1,2\n".as_bytes()).unwrap();
        assert!(matches!(table.run_date_index(), Err(AppError::Schema(_))));
    }
}
