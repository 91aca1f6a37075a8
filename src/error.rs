//! Error type shared by every stage of the pipeline.
//!
//! Each variant maps to a process exit code so `main.rs` can stay a thin
//! wrapper: print the message, exit with `err.exit_code()`.

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    /// A raw record is missing a required field or carries a value of the wrong type.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Crypto normalization found no row quoted in the reference currency.
    #[error("Missing reference price: no {currency}-quoted row in the {symbol} snapshot")]
    MissingReference { symbol: String, currency: String },

    /// A merge was requested with an empty or mixed run-date batch.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Another writer holds the report table lock.
    #[error("Report table is locked by another writer ('{}')", .0.display())]
    Locked(PathBuf),

    /// Some domains failed while others completed.
    #[error("{failed} of {total} domain(s) failed; see log for details")]
    Incomplete { failed: usize, total: usize },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io(_) | AppError::NotFound(_) | AppError::Locked(_) => 2,
            AppError::Schema(_) | AppError::MissingReference { .. } => 3,
            AppError::Network(_) => 4,
            AppError::InvariantViolation(_) => 5,
            AppError::Incomplete { .. } => 6,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Schema(format!("invalid JSON payload: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds_have_distinct_exit_codes() {
        let schema = AppError::Schema("x".to_string());
        let reference = AppError::MissingReference {
            symbol: "BTC".to_string(),
            currency: "USD".to_string(),
        };
        let invariant = AppError::InvariantViolation("x".to_string());

        assert_eq!(schema.exit_code(), 3);
        assert_eq!(reference.exit_code(), 3);
        assert_eq!(invariant.exit_code(), 5);
        assert!(reference.to_string().contains("USD"));
    }
}
