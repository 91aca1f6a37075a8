//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments into a `PipelineConfig`
//! - dispatches to the fetch/process stages in `pipeline`
//! - prints summaries and maps partial failure to an error exit

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DomainArgs};
use crate::config::{Paths, PipelineConfig};
use crate::domain::Domain;
use crate::error::AppError;
use crate::io::raw::RawDir;
use crate::store::CsvDirStore;

pub mod pipeline;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    let paths = Paths {
        raw_dir: cli.raw_dir.clone(),
        reports_dir: cli.reports_dir.clone(),
    };
    let timeout = std::time::Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Command::Fetch(args) => {
            let config = pipeline_config_from_args(paths, timeout, &args);
            handle_fetch(&config, &args.selected())
        }
        Command::Process(args) => {
            let config = pipeline_config_from_args(paths, timeout, &args);
            handle_process(&config, &args.selected())
        }
        Command::Run(args) => {
            let config = pipeline_config_from_args(paths, timeout, &args);
            handle_run(&config, &args.selected())
        }
        Command::Status => handle_status(&paths),
    }
}

/// Logs go to stderr so summaries on stdout stay clean for scripting.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fetch(config: &PipelineConfig, domains: &[Domain]) -> Result<(), AppError> {
    let raw = RawDir::new(&config.paths.raw_dir);
    let results = pipeline::fetch_all(config, &raw, domains, Utc::now())?;
    println!("{}", crate::report::format_fetch_summary(&results));
    pipeline::overall(&results)
}

fn handle_process(config: &PipelineConfig, domains: &[Domain]) -> Result<(), AppError> {
    let raw = RawDir::new(&config.paths.raw_dir);
    let store = CsvDirStore::new(&config.paths.reports_dir);
    let results = pipeline::process_all(config, &raw, &store, domains);
    println!("{}", crate::report::format_process_summary(&results));
    pipeline::overall(&results)
}

/// Fetch every selected domain, then process the ones that fetched cleanly.
fn handle_run(config: &PipelineConfig, domains: &[Domain]) -> Result<(), AppError> {
    let raw = RawDir::new(&config.paths.raw_dir);
    let fetched = pipeline::fetch_all(config, &raw, domains, Utc::now())?;
    println!("{}", crate::report::format_fetch_summary(&fetched));

    let ready: Vec<Domain> = fetched.iter().filter(|(_, r)| r.is_ok()).map(|(d, _)| *d).collect();
    let fetch_failures = fetched.len() - ready.len();
    if ready.is_empty() {
        return pipeline::overall(&fetched);
    }

    info!(domains = ready.len(), "Processing fetched snapshots");
    let store = CsvDirStore::new(&config.paths.reports_dir);
    let processed = pipeline::process_all(config, &raw, &store, &ready);
    println!("{}", crate::report::format_process_summary(&processed));

    let failed = fetch_failures + processed.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(AppError::Incomplete {
            failed,
            total: domains.len(),
        });
    }
    Ok(())
}

fn handle_status(paths: &Paths) -> Result<(), AppError> {
    let store = CsvDirStore::new(&paths.reports_dir);
    let statuses = pipeline::table_statuses(&store)?;
    println!("{}", crate::report::format_status(&statuses));
    Ok(())
}

pub fn pipeline_config_from_args(paths: Paths, http_timeout: std::time::Duration, args: &DomainArgs) -> PipelineConfig {
    let mut config = PipelineConfig {
        paths,
        http_timeout,
        ..PipelineConfig::default()
    };
    config.crypto.reference_currency = args.reference_currency.trim().to_uppercase();
    config.jobs.skills.top_n = args.top_skills;
    config
        .jobs
        .skills
        .stopwords
        .extend(args.stopwords.iter().map(|w| w.trim().to_lowercase()));
    config
}

/// Options whose next token is a value, never a subcommand.
const OPTIONS_WITH_VALUE: [&str; 6] = [
    "--raw-dir",
    "--reports-dir",
    "--timeout-secs",
    "--top-skills",
    "--reference-currency",
    "--stopword",
];

/// Rewrite argv so `pulse` defaults to `pulse process`.
///
/// Rules:
/// - `pulse`                       -> `pulse process`
/// - `pulse crypto jobs`           -> `pulse process crypto jobs`
/// - `pulse --help/--version/-h`   -> unchanged
/// - first positional is a subcommand -> unchanged (global flags may precede it)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("process".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        first_positional(&argv),
        Some("fetch" | "process" | "run" | "status")
    );
    if is_subcommand {
        return argv;
    }

    argv.insert(1, "process".to_string());
    argv
}

fn first_positional(argv: &[String]) -> Option<&str> {
    let mut rest = argv.iter().skip(1);
    while let Some(arg) = rest.next() {
        if OPTIONS_WITH_VALUE.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_process() {
        assert_eq!(rewrite_args(args(&["pulse"])), args(&["pulse", "process"]));
        assert_eq!(
            rewrite_args(args(&["pulse", "crypto", "--top-skills", "10"])),
            args(&["pulse", "process", "crypto", "--top-skills", "10"])
        );
    }

    #[test]
    fn explicit_subcommand_is_untouched() {
        let argv = args(&["pulse", "--reports-dir", "out", "status"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        assert_eq!(rewrite_args(args(&["pulse", "--help"])), args(&["pulse", "--help"]));
    }

    #[test]
    fn subcommand_names_in_values_do_not_count() {
        let argv = rewrite_args(args(&["pulse", "jobs", "--stopword", "lead", "--stopword", "run"]));
        assert_eq!(argv[1], "process");
        let cli = Cli::try_parse_from(&argv).unwrap();
        let Command::Process(domain_args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(domain_args.selected(), vec![Domain::Jobs]);
        assert_eq!(domain_args.stopwords, args(&["lead", "run"]));

        let argv = rewrite_args(args(&["pulse", "--raw-dir", "status", "crypto"]));
        assert_eq!(argv[1], "process");
        assert!(Cli::try_parse_from(&argv).is_ok());
    }

    #[test]
    fn config_applies_cli_overrides() {
        let cli = Cli::try_parse_from(["pulse", "process", "--reference-currency", "eur", "--stopword", "Rust"])
            .unwrap();
        let Command::Process(domain_args) = cli.command else {
            panic!("expected process");
        };
        let config = pipeline_config_from_args(Paths::default(), std::time::Duration::from_secs(5), &domain_args);
        assert_eq!(config.crypto.reference_currency, "EUR");
        assert!(config.jobs.skills.stopwords.contains("rust"));
        assert!(config.jobs.skills.stopwords.contains("remote"));
        assert_eq!(config.http_timeout, std::time::Duration::from_secs(5));
    }
}
