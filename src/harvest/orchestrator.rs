//! Crawl orchestration across all (board, market) units
//!
//! The orchestrator expands the configured boards against the requested
//! market filter into crawl units, drives them strictly sequentially (the
//! navigation session is exclusive), aggregates records, and owns the run
//! statistics for the lifetime of the run.

use crate::config::Config;
use crate::harvest::navigator::Navigator;
use crate::harvest::page::PageFetch;
use crate::harvest::retry::RetryPolicy;
use crate::model::{CompanyRecord, CrawlUnit, MarketFilter, RunStatistics};
use crate::HarvestError;
use url::Url;

/// Everything one harvest run produced
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Raw records in encounter order, pre-deduplication
    pub records: Vec<CompanyRecord>,

    /// Finalized run statistics
    pub stats: RunStatistics,
}

/// Runs the full crawl across all configured boards
pub struct Orchestrator<'a, S: PageFetch> {
    source: &'a S,
    config: &'a Config,
    base: Url,
}

impl<'a, S: PageFetch> Orchestrator<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Result<Self, HarvestError> {
        let base = Url::parse(&config.source.base_url)?;
        Ok(Self {
            source,
            config,
            base,
        })
    }

    /// Expands boards x markets into crawl units, honoring the filters
    fn build_units(&self, filter: MarketFilter, board_filter: Option<&str>) -> Vec<CrawlUnit> {
        let market_ids = filter.market_ids();

        self.config
            .board
            .iter()
            .filter(|entry| match board_filter {
                Some(wanted) => {
                    entry.name == wanted
                        || entry
                            .name_en
                            .as_deref()
                            .is_some_and(|en| en.eq_ignore_ascii_case(wanted))
                }
                None => true,
            })
            .flat_map(|entry| {
                market_ids
                    .iter()
                    .map(|&market_id| CrawlUnit::new(entry.id, entry.name.clone(), market_id))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Runs all crawl units sequentially and returns the aggregated outcome
    ///
    /// Unit failures are recorded and skipped past; the outcome always
    /// carries whatever was accumulated. Statistics are finalized exactly
    /// once before returning, on every path.
    pub async fn run(
        &self,
        filter: MarketFilter,
        board_filter: Option<&str>,
    ) -> HarvestOutcome {
        let mut stats = RunStatistics::start();
        let mut records: Vec<CompanyRecord> = Vec::new();

        let units = self.build_units(filter, board_filter);
        if units.is_empty() {
            stats.record_error("no crawl units matched the requested filters");
            stats.finalize();
            return HarvestOutcome { records, stats };
        }

        let policy = RetryPolicy::from(&self.config.retry);
        let navigator = Navigator::new(
            self.source,
            &self.base,
            policy,
            self.config.harvest.max_pages_per_unit,
            &self.config.source.sector_keywords,
        );

        let total_units = units.len();
        let mut last_board: Option<u32> = None;

        for (index, unit) in units.iter().enumerate() {
            // Rate tolerance: pause between boards, not between markets of
            // the same board
            if last_board.is_some() && last_board != Some(unit.board_id) {
                tokio::time::sleep(self.config.harvest.inter_board_delay()).await;
            }
            last_board = Some(unit.board_id);

            tracing::info!(
                "Unit {}/{}: board {} market id {}",
                index + 1,
                total_units,
                unit.board_name,
                unit.market_id
            );

            let outcome = navigator.traverse(unit).await;

            stats.record_board(&unit.board_name, outcome.records.len());
            for error in outcome.errors {
                stats.record_error(format!(
                    "board {} (market id {}): {}",
                    unit.board_name, unit.market_id, error
                ));
            }
            records.extend(outcome.records);
        }

        stats.companies_found = records.len();
        stats.finalize();

        if records.is_empty() {
            tracing::error!("Harvest produced no usable records");
        } else {
            tracing::info!(
                "Harvest complete: {} records from {} boards in {}s ({} errors)",
                stats.companies_found,
                stats.companies_by_board.len(),
                stats.duration_seconds(),
                stats.errors.len()
            );
        }

        HarvestOutcome { records, stats }
    }
}
