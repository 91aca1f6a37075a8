//! Command-line parsing for the daily snapshot pipeline.
//!
//! Argument parsing stays here; command dispatch lives in `crate::app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Domain;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Daily economy and remote-jobs snapshot reports")]
pub struct Cli {
    /// Directory holding raw snapshot CSVs (`raw_<domain>_YYYY_MM_DD.csv`).
    #[arg(long, global = true, env = "PULSE_RAW_DIR", default_value = "outputs/raw")]
    pub raw_dir: PathBuf,

    /// Root directory of the append-only report tables.
    #[arg(long, global = true, env = "PULSE_REPORTS_DIR", default_value = "outputs/reports")]
    pub reports_dir: PathBuf,

    /// HTTP timeout for provider requests, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download today's provider data into raw snapshot files.
    Fetch(DomainArgs),
    /// Normalize the latest raw snapshots and merge them into the report tables.
    Process(DomainArgs),
    /// Fetch, then process.
    Run(DomainArgs),
    /// Show row counts and run dates of every report table.
    Status,
}

/// Domain selection and report options shared by the pipeline commands.
#[derive(Debug, Args, Clone)]
pub struct DomainArgs {
    /// Domains to handle (all when omitted).
    #[arg(value_enum)]
    pub domains: Vec<Domain>,

    /// Keep the N most frequent skill tokens.
    #[arg(long, default_value_t = 30)]
    pub top_skills: usize,

    /// Currency used to derive the crypto `price_usd` column.
    #[arg(long, default_value = "USD")]
    pub reference_currency: String,

    /// Extra words to ignore when counting skill tokens (repeatable).
    #[arg(long = "stopword", value_name = "WORD")]
    pub stopwords: Vec<String>,
}

impl DomainArgs {
    pub fn selected(&self) -> Vec<Domain> {
        if self.domains.is_empty() {
            return Domain::ALL.to_vec();
        }
        let mut out = Vec::with_capacity(self.domains.len());
        for &d in &self.domains {
            if !out.contains(&d) {
                out.push(d);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_domains_and_global_paths() {
        let cli = Cli::try_parse_from([
            "pulse",
            "process",
            "crypto",
            "jobs",
            "crypto",
            "--reports-dir",
            "/tmp/reports",
        ])
        .unwrap();
        assert_eq!(cli.reports_dir, PathBuf::from("/tmp/reports"));
        let Command::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.selected(), vec![Domain::Crypto, Domain::Jobs]);
        assert_eq!(args.top_skills, 30);
    }

    #[test]
    fn no_domains_means_all() {
        let cli = Cli::try_parse_from(["pulse", "fetch"]).unwrap();
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.selected(), Domain::ALL.to_vec());
    }

    #[test]
    fn rejects_unknown_domain() {
        assert!(Cli::try_parse_from(["pulse", "process", "stocks"]).is_err());
    }
}
