//! Harvest module: session, traversal, extraction, and the run driver
//!
//! The submodules split along the crawl lifecycle:
//! - `page`: the HTTP session, listing parse, and next-page discovery
//! - `retry`: failure classification and bounded retry
//! - `extract`: table row to company record extraction
//! - `navigator`: per-unit pagination traversal
//! - `orchestrator`: sequential traversal of all crawl units
//!
//! `run_harvest` ties the lifecycle to the pipeline and the store; it is
//! what both the CLI and the scheduler invoke.

pub mod extract;
pub mod navigator;
pub mod orchestrator;
pub mod page;
pub mod retry;

pub use navigator::{Navigator, UnitOutcome};
pub use orchestrator::{HarvestOutcome, Orchestrator};
pub use page::{HttpSession, ListingPage, PageFetch};
pub use retry::{FailureClass, RetryPolicy};

use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::model::{MarketFilter, RunStatus};
use crate::pipeline::{dedup_records, reconcile, ReconciliationDelta};
use crate::storage::{apply_delta, RunLog, SqliteStore, Store, StoredCompany};
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

/// Runs one complete harvest: crawl, dedup, reconcile, persist, export
///
/// A session that cannot be established still produces a failed run entry
/// in the store, so scheduled runs leave a trace even when the source is
/// unreachable.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `config_hash` - Hash of the loaded configuration file
/// * `filter` - Which markets to harvest
/// * `board_filter` - Restrict to one board by name, if given
/// * `export_format` - Which export files to write, if any
///
/// # Returns
///
/// The run entry that was persisted to the store
pub async fn run_harvest(
    config: &Config,
    config_hash: &str,
    filter: MarketFilter,
    board_filter: Option<&str>,
    export_format: Option<ExportFormat>,
) -> Result<RunLog> {
    let mut store = SqliteStore::open(Path::new(&config.output.database_path))?;

    let session = match HttpSession::connect(&config.source, config.harvest.page_timeout()) {
        Ok(session) => session,
        Err(e) => {
            error!("Could not establish a session: {}", e);
            let run = RunLog {
                run_at: Utc::now(),
                total_companies: 0,
                new_companies: 0,
                updated_companies: 0,
                delisted_companies: 0,
                duration_seconds: 0,
                status: RunStatus::Failed,
                error_message: Some(e.to_string()),
                config_hash: config_hash.to_string(),
            };
            store.log_run(&run)?;
            return Ok(run);
        }
    };

    let orchestrator = Orchestrator::new(&session, config)?;
    let outcome = orchestrator.run(filter, board_filter).await;

    let records = dedup_records(outcome.records);
    info!("{} unique companies after deduplication", records.len());

    // A run with zero usable records says nothing about the registry, so
    // the stored state is left untouched rather than read as "no companies
    // exist anymore".
    let delta = if records.is_empty() {
        warn!("No usable records harvested, leaving the stored registry untouched");
        ReconciliationDelta::default()
    } else {
        let prior = scoped_prior(&store, config, filter, board_filter)?;
        let delta = reconcile(&records, &prior);
        info!(
            "Reconciliation: {} new, {} updated, {} delisted",
            delta.new.len(),
            delta.updated.len(),
            delta.delisted.len()
        );
        apply_delta(&mut store, &records, &delta)?;
        delta
    };

    let run = RunLog {
        run_at: outcome.stats.started_at,
        total_companies: records.len() as u32,
        new_companies: delta.new.len() as u32,
        updated_companies: delta.updated.len() as u32,
        delisted_companies: delta.delisted.len() as u32,
        duration_seconds: outcome.stats.duration_seconds(),
        status: outcome.stats.status(),
        error_message: if outcome.stats.errors.is_empty() {
            None
        } else {
            Some(outcome.stats.errors.join("; "))
        },
        config_hash: config_hash.to_string(),
    };
    store.log_run(&run)?;

    if run.status == RunStatus::Partial {
        warn!(
            "Run completed partially: {} error(s) recorded",
            outcome.stats.errors.len()
        );
    }

    if let Some(format) = export_format {
        if records.is_empty() {
            warn!("Skipping exports: nothing was harvested");
        } else {
            let export_dir = Path::new(&config.output.export_dir);
            export::write_exports(export_dir, &records, format)?;
        }
    }

    Ok(run)
}

/// Loads the prior active companies restricted to the run's scope
///
/// A filtered run only observes part of the registry, so only that part may
/// be diffed: diffing a TASI-only crawl against the full map would delist
/// every Nomu company. Market scope matches the stored market label; board
/// scope matches the boards the filter selects (by Arabic or English name,
/// the same matching the orchestrator applies).
fn scoped_prior(
    store: &SqliteStore,
    config: &Config,
    filter: MarketFilter,
    board_filter: Option<&str>,
) -> Result<HashMap<String, StoredCompany>> {
    let mut prior = store.load_active_companies()?;

    if let MarketFilter::One(market) = filter {
        prior.retain(|_, stored| stored.market == market.label());
    }

    if let Some(wanted) = board_filter {
        let in_scope: Vec<&str> = config
            .board
            .iter()
            .filter(|entry| {
                entry.name == wanted
                    || entry
                        .name_en
                        .as_deref()
                        .is_some_and(|en| en.eq_ignore_ascii_case(wanted))
            })
            .map(|entry| entry.name.as_str())
            .collect();
        prior.retain(|_, stored| in_scope.contains(&stored.shariah_board.as_str()));
    }

    Ok(prior)
}
