//! Shared pipeline logic used by the CLI commands.
//!
//! Two stages, one domain at a time:
//! - fetch:   provider JSON -> raw records -> `raw_<domain>_YYYY_MM_DD.csv`
//! - process: latest raw snapshot -> normalize -> merge each report table
//!
//! A failing domain is logged and reported; it never stops the others, and
//! reports already merged in the same invocation are kept.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::data::{CoinGeckoClient, CurrencyApiClient, JsonClient, RemotiveClient, WorldBankClient};
use crate::domain::{Domain, JobRow, RawRecord, ReportKind, ReportRow, RunDate};
use crate::error::{AppError, Result};
use crate::io::raw::{RawDir, RawSnapshotSource};
use crate::normalize::{crypto, forex, inflation, jobs};
use crate::report::{SkillTokenExtractor, average_salaries, job_growth_daily, jobs_by_country};
use crate::store::{MergeOutcome, ReportStore};

/// What happened to one report table during `process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Merged(MergeOutcome),
    /// Nothing derived for this run date (e.g. no salary figures); table untouched.
    Empty,
}

#[derive(Debug, Clone)]
pub struct ReportResult {
    pub report: ReportKind,
    pub status: ReportStatus,
}

/// All outputs of processing one domain's latest snapshot.
#[derive(Debug, Clone)]
pub struct ProcessedDomain {
    pub domain: Domain,
    pub run_date: RunDate,
    pub origin: String,
    pub records: usize,
    pub reports: Vec<ReportResult>,
}

/// A raw snapshot written by `fetch`.
#[derive(Debug, Clone)]
pub struct FetchedSnapshot {
    pub domain: Domain,
    pub run_date: RunDate,
    pub path: PathBuf,
    pub records: usize,
}

/// Row count and run dates of one persisted table.
#[derive(Debug, Clone)]
pub struct TableStatus {
    pub report: ReportKind,
    pub rows: usize,
    pub run_dates: BTreeSet<RunDate>,
}

/// Load the latest raw snapshot for `domain`, normalize it, and merge every
/// report it feeds.
pub fn process_domain<S: RawSnapshotSource, T: ReportStore>(
    config: &PipelineConfig,
    source: &S,
    store: &T,
    domain: Domain,
) -> Result<ProcessedDomain> {
    let snapshot = source.load_latest(domain)?;
    let run_date = snapshot.run_date;
    info!(
        domain = %domain,
        %run_date,
        records = snapshot.records.len(),
        origin = %snapshot.origin,
        "Processing raw snapshot"
    );

    let reports = match domain {
        Domain::Forex => {
            let rows = forex::normalize(&snapshot.records, run_date)?;
            vec![merge_report(store, ReportKind::ForexDaily, &rows, run_date)?]
        }
        Domain::Crypto => {
            let rows = crypto::normalize(&snapshot.records, &config.crypto, run_date)?;
            vec![merge_report(store, ReportKind::CryptoDaily, &rows, run_date)?]
        }
        Domain::Inflation => {
            let rows = inflation::normalize(&snapshot.records, run_date)?;
            vec![merge_report(store, ReportKind::InflationDaily, &rows, run_date)?]
        }
        Domain::Jobs => {
            let listings = jobs::normalize(&snapshot.records)?;
            process_jobs(config, store, &listings, run_date)?
        }
    };

    Ok(ProcessedDomain {
        domain,
        run_date,
        origin: snapshot.origin,
        records: snapshot.records.len(),
        reports,
    })
}

/// The four jobs reports, merged independently in order.
pub fn process_jobs<T: ReportStore>(
    config: &PipelineConfig,
    store: &T,
    listings: &[JobRow],
    run_date: RunDate,
) -> Result<Vec<ReportResult>> {
    let extractor = SkillTokenExtractor::new(&config.jobs.skills)?;
    Ok(vec![
        merge_report(store, ReportKind::SkillsDemanded, &extractor.extract(listings, run_date), run_date)?,
        merge_report(store, ReportKind::JobsByCountry, &jobs_by_country(listings, run_date), run_date)?,
        merge_report(store, ReportKind::JobGrowth, &job_growth_daily(listings, run_date), run_date)?,
        merge_report(store, ReportKind::AverageSalaries, &average_salaries(listings, run_date), run_date)?,
    ])
}

fn merge_report<T: ReportStore, R: ReportRow>(
    store: &T,
    report: ReportKind,
    rows: &[R],
    run_date: RunDate,
) -> Result<ReportResult> {
    if rows.is_empty() {
        warn!(table = report.table_name(), %run_date, "No rows derived; report left unchanged");
        return Ok(ReportResult {
            report,
            status: ReportStatus::Empty,
        });
    }
    let outcome = store.merge_run_date(report.table_name(), rows, run_date)?;
    Ok(ReportResult {
        report,
        status: ReportStatus::Merged(outcome),
    })
}

/// Process each domain independently.
pub fn process_all<S: RawSnapshotSource, T: ReportStore>(
    config: &PipelineConfig,
    source: &S,
    store: &T,
    domains: &[Domain],
) -> Vec<(Domain, Result<ProcessedDomain>)> {
    domains
        .iter()
        .map(|&domain| {
            let result = process_domain(config, source, store, domain);
            if let Err(e) = &result {
                error!(domain = %domain, error = %e, "Processing failed; other domains continue");
            }
            (domain, result)
        })
        .collect()
}

/// Fetch one provider and write the raw snapshot for the UTC day of `now`.
pub fn fetch_domain(
    config: &PipelineConfig,
    http: &JsonClient,
    raw: &RawDir,
    domain: Domain,
    now: DateTime<Utc>,
) -> Result<FetchedSnapshot> {
    let today = now.date_naive();
    let records: Vec<RawRecord> = match domain {
        Domain::Forex => {
            let client = CurrencyApiClient::from_env(http.clone(), &config.forex)?;
            info!("Fetching FX data from currencyapi.com");
            forex::records_from_currencyapi(&client.fetch_latest()?, &config.forex, now)?
        }
        Domain::Crypto => {
            let client = CoinGeckoClient::new(http.clone(), &config.crypto);
            info!(coin = %config.crypto.coin_id, "Fetching crypto prices from CoinGecko");
            crypto::records_from_coingecko(&client.fetch_prices()?, &config.crypto, today, now)?
        }
        Domain::Inflation => {
            let client = WorldBankClient::new(http.clone(), &config.inflation);
            let mut payloads = Vec::with_capacity(config.inflation.countries.len());
            for country in &config.inflation.countries {
                info!(country = %country.name, code = %country.code, "Fetching inflation data");
                payloads.push((country, client.fetch_latest(country)?));
            }
            inflation::records_from_world_bank(
                payloads.iter().map(|(country, payload)| (*country, payload)),
                &config.inflation,
                now,
            )?
        }
        Domain::Jobs => {
            let client = RemotiveClient::new(http.clone(), &config.jobs);
            info!("Fetching remote jobs from Remotive");
            jobs::records_from_remotive(&client.fetch_jobs()?, now)
        }
    };

    let run_date = RunDate::new(today);
    let path = raw.write_snapshot(domain, run_date, &records)?;
    Ok(FetchedSnapshot {
        domain,
        run_date,
        path,
        records: records.len(),
    })
}

/// Fetch each domain independently.
pub fn fetch_all(
    config: &PipelineConfig,
    raw: &RawDir,
    domains: &[Domain],
    now: DateTime<Utc>,
) -> Result<Vec<(Domain, Result<FetchedSnapshot>)>> {
    let http = JsonClient::new(config.http_timeout)?;
    Ok(domains
        .iter()
        .map(|&domain| {
            let result = fetch_domain(config, &http, raw, domain, now);
            if let Err(e) = &result {
                error!(domain = %domain, error = %e, "Fetch failed; other domains continue");
            }
            (domain, result)
        })
        .collect())
}

/// Current state of every report table (`None` for tables not created yet).
pub fn table_statuses<T: ReportStore>(store: &T) -> Result<Vec<(ReportKind, Option<TableStatus>)>> {
    ReportKind::ALL
        .iter()
        .map(|&report| {
            let status = match store.load(report.table_name())? {
                Some(table) => Some(TableStatus {
                    report,
                    rows: table.rows.len(),
                    run_dates: table.run_dates()?,
                }),
                None => None,
            };
            Ok((report, status))
        })
        .collect()
}

/// Turn per-domain results into the command's overall result.
pub fn overall<T>(results: &[(Domain, Result<T>)]) -> Result<()> {
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(AppError::Incomplete {
            failed,
            total: results.len(),
        });
    }
    Ok(())
}
