//! `pulse-reports` library crate.
//!
//! The binary (`pulse`) is a thin wrapper around this library so that:
//!
//! - normalizers and the report merge are testable without spawning processes
//! - the store and snapshot source traits can be backed by something other than CSV files

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod report;
pub mod store;
