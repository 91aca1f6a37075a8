//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - datasets and report tables (`Domain`, `ReportKind`)
//! - raw provider records (`RawRecord`)
//! - canonical report rows (`ForexRow`, `CryptoRow`, ...)

pub mod parse;
pub mod types;

pub use parse::*;
pub use types::*;
