//! Paginated traversal of one crawl unit
//!
//! The navigator drives a single (board, market) unit through its pages:
//!
//! ```text
//! Init -> Loaded -> { ExtractedPage -> NextPageAvailable -> Loaded }* -> Done
//! ```
//!
//! Page loads go through the retry governor; exhausted retries end the
//! traversal with a unit-level error rather than aborting the run. A hard
//! page ceiling bounds worst-case runtime against a misbehaving pagination
//! control.

use crate::harvest::extract::extract_record;
use crate::harvest::page::PageFetch;
use crate::harvest::retry::{with_retry, RetryPolicy};
use crate::model::{CompanyRecord, CrawlUnit};
use crate::SourceError;
use url::Url;

/// Traversal states of one crawl unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Init,
    Loaded,
    ExtractedPage,
    NextPageAvailable,
    Done,
}

/// Everything one unit traversal produced
#[derive(Debug, Default)]
pub struct UnitOutcome {
    /// Records in encounter order across all pages
    pub records: Vec<CompanyRecord>,

    /// Error descriptions; empty on full success
    pub errors: Vec<String>,

    /// Pages actually loaded
    pub pages_visited: u32,
}

/// Drives paginated traversals against one page source
pub struct Navigator<'a, S: PageFetch> {
    source: &'a S,
    base: &'a Url,
    policy: RetryPolicy,
    max_pages: u32,
    sector_keywords: &'a [String],
}

impl<'a, S: PageFetch> Navigator<'a, S> {
    pub fn new(
        source: &'a S,
        base: &'a Url,
        policy: RetryPolicy,
        max_pages: u32,
        sector_keywords: &'a [String],
    ) -> Self {
        Self {
            source,
            base,
            policy,
            max_pages,
            sector_keywords,
        }
    }

    /// Traverses all pages of one crawl unit
    ///
    /// Never fails outright: traversal errors are collected in the outcome
    /// so the orchestrator can move on to the next unit.
    pub async fn traverse(&self, unit: &CrawlUnit) -> UnitOutcome {
        let mut outcome = UnitOutcome::default();
        let mut state = NavState::Init;

        let mut current = match unit.address(self.base) {
            Ok(url) => url,
            Err(e) => {
                outcome.errors.push(format!("invalid listing address: {}", e));
                return outcome;
            }
        };

        tracing::info!(
            "Traversing board {} (market id {}) from {}",
            unit.board_name,
            unit.market_id,
            current
        );

        loop {
            let fetched = with_retry(&self.policy, SourceError::class, || {
                self.source.fetch_listing(&current)
            })
            .await;

            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    outcome.errors.push(e.to_string());
                    state = NavState::Done;
                    break;
                }
            };
            state = NavState::Loaded;
            tracing::trace!(?state, url = %current);
            outcome.pages_visited += 1;

            let before = outcome.records.len();
            for row in &page.rows {
                if let Some(record) = extract_record(row, unit, self.sector_keywords) {
                    outcome.records.push(record);
                }
            }
            state = NavState::ExtractedPage;
            tracing::trace!(?state);
            tracing::debug!(
                "Page {}: {} rows, {} records",
                outcome.pages_visited,
                page.rows.len(),
                outcome.records.len() - before
            );

            match page.next_page {
                Some(next) if outcome.pages_visited < self.max_pages => {
                    state = NavState::NextPageAvailable;
                    tracing::trace!(?state, "advancing to {}", next);
                    current = next;
                }
                Some(_) => {
                    tracing::warn!(
                        "Page ceiling ({}) reached for board {}, stopping traversal",
                        self.max_pages,
                        unit.board_name
                    );
                    state = NavState::Done;
                    break;
                }
                None => {
                    state = NavState::Done;
                    break;
                }
            }
        }

        debug_assert_eq!(state, NavState::Done);
        tracing::info!(
            "Board {} (market id {}): {} records over {} pages",
            unit.board_name,
            unit.market_id,
            outcome.records.len(),
            outcome.pages_visited
        );
        outcome
    }
}
