//! Run statistics and run status
//!
//! `RunStatistics` is owned exclusively by the orchestrator for the lifetime
//! of a run and finalized exactly once, on every exit path.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Outcome status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// All units completed and at least one record was harvested
    Success,
    /// Some units failed but usable records were still harvested
    Partial,
    /// No usable records, or the run aborted fatally
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Mutable statistics accumulated over one harvest run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished; set exactly once by `finalize`
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of boards fully traversed
    pub boards_harvested: u32,

    /// Total records found across all units (pre-deduplication)
    pub companies_found: usize,

    /// Per-board record counts
    pub companies_by_board: BTreeMap<String, usize>,

    /// Ordered list of error descriptions accumulated during the run
    pub errors: Vec<String>,
}

impl RunStatistics {
    /// Starts a fresh statistics record with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            boards_harvested: 0,
            companies_found: 0,
            companies_by_board: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Records the record count for one board's traversal
    pub fn record_board(&mut self, board: &str, count: usize) {
        self.boards_harvested += 1;
        *self.companies_by_board.entry(board.to_string()).or_insert(0) += count;
    }

    /// Appends an error description
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Sets the end timestamp. Idempotent: the first call wins, so every
    /// exit path can finalize without clobbering an earlier timestamp.
    pub fn finalize(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Run duration in whole seconds, zero until finalized
    pub fn duration_seconds(&self) -> i64 {
        self.finished_at
            .map(|end| (end - self.started_at).num_seconds())
            .unwrap_or(0)
    }

    /// Derives the run status from the accumulated state
    ///
    /// A run with zero usable records is a failed run, never "zero companies
    /// exist". A run with records but recorded errors is partial.
    pub fn status(&self) -> RunStatus {
        if self.companies_found == 0 {
            RunStatus::Failed
        } else if self.errors.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }
}
