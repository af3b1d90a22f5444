//! Storage trait and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::CompanyRecord;
use crate::storage::{ChangeType, RunLog, StoreStatistics, StoredCompany};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations the harvest pipeline needs.
pub trait Store {
    // ===== Companies =====

    /// Loads all active companies keyed by exchange code
    ///
    /// The returned map is the prior state that reconciliation diffs a
    /// fresh crawl against.
    fn load_active_companies(&self) -> StoreResult<HashMap<String, StoredCompany>>;

    /// Inserts a company or refreshes all its fields
    ///
    /// An upsert always reactivates the row; a company seen in the
    /// current crawl is active by definition.
    fn upsert_company(&mut self, record: &CompanyRecord) -> StoreResult<()>;

    /// Marks a company inactive without deleting its row
    fn mark_delisted(&mut self, company_code: &str) -> StoreResult<()>;

    // ===== History =====

    /// Appends one audit entry for a company
    fn record_history(
        &mut self,
        company_code: &str,
        change: ChangeType,
        details: Option<&str>,
    ) -> StoreResult<()>;

    // ===== Runs =====

    /// Records a completed harvest run
    ///
    /// # Returns
    ///
    /// The row ID of the new run entry
    fn log_run(&mut self, run: &RunLog) -> StoreResult<i64>;

    /// Gets the most recent run, if any
    fn last_run(&self) -> StoreResult<Option<RunLog>>;

    // ===== Statistics =====

    /// Aggregate counts over the stored registry
    fn statistics(&self) -> StoreResult<StoreStatistics>;
}
