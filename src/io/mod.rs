//! Raw snapshot files.
//!
//! - discovery of the latest `raw_<domain>_YYYY_MM_DD.csv` and its run date
//! - tolerant CSV ingest into `RawRecord`s
//! - snapshot writes for the fetch stage

pub mod raw;

pub use raw::*;
