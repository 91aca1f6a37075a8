//! Report tables as CSV files under a root directory.
//!
//! Table `economy/forex_daily` lives at `<root>/economy/forex_daily.csv`.
//!
//! A merge holds an exclusive advisory lock on `<file>.csv.lock` for the whole
//! read-modify-write, and saves go through `<file>.csv.tmp` renamed over the
//! target, so a crash never leaves a truncated table behind. The OS releases
//! the lock when the holder exits, so the lock file itself may stay on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::store::{ReportStore, Table};

#[derive(Debug, Clone)]
pub struct CsvDirStore {
    root: PathBuf,
}

impl CsvDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

impl ReportStore for CsvDirStore {
    fn load(&self, table: &str) -> Result<Option<Table>> {
        let path = self.table_path(table);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Io(format!(
                    "Failed to open report table '{}': {e}",
                    path.display()
                )));
            }
        };
        Table::read_from(BufReader::new(file))
            .map(Some)
            .map_err(|e| match e {
                AppError::Schema(msg) => AppError::Schema(format!("{}: {msg}", path.display())),
                other => other,
            })
    }

    fn save(&self, table: &str, contents: &Table) -> Result<()> {
        let path = self.table_path(table);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Io(format!("Failed to create report directory '{}': {e}", parent.display()))
            })?;
        }

        let tmp = Self::sibling(&path, ".tmp");
        let file = File::create(&tmp)
            .map_err(|e| AppError::Io(format!("Failed to create '{}': {e}", tmp.display())))?;
        let mut writer = BufWriter::new(file);
        contents.write_to(&mut writer)?;
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| AppError::Io(format!("Failed to flush '{}': {e}", tmp.display())))?;
        file.sync_all()?;

        fs::rename(&tmp, &path).map_err(|e| {
            AppError::Io(format!(
                "Failed to move '{}' into place at '{}': {e}",
                tmp.display(),
                path.display()
            ))
        })?;
        debug!(path = %path.display(), rows = contents.rows.len(), "Saved report table");
        Ok(())
    }

    fn with_exclusive<T>(&self, table: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let path = self.table_path(table);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let _lock = LockFile::acquire(Self::sibling(&path, ".lock"))?;
        f()
    }
}

/// Exclusive lock held until drop.
struct LockFile {
    file: File,
}

impl LockFile {
    fn acquire(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| AppError::Io(format!("Failed to open lock '{}': {e}", path.display())))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if is_contended(&e) => Err(AppError::Locked(path)),
            Err(e) => Err(AppError::Io(format!("Failed to acquire lock on '{}': {e}", path.display()))),
        }
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
