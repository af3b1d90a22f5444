//! Storage module for persisting harvested companies
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - The canonical company registry and its active/delisted flags
//! - The per-company audit history
//! - Run logging and aggregate statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Store, StoreError, StoreResult};

use crate::model::{CompanyRecord, RunStatus};
use crate::pipeline::ReconciliationDelta;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::open(path)
}

/// The stored fields reconciliation compares against a fresh crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCompany {
    pub company_name: String,
    pub market: String,
    pub shariah_board: String,
    pub sector: Option<String>,
}

/// Kind of change recorded in the company history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    New,
    Updated,
    Delisted,
}

impl ChangeType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Delisted => "delisted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "updated" => Some(Self::Updated),
            "delisted" => Some(Self::Delisted),
            _ => None,
        }
    }
}

/// Summary row persisted for each completed harvest run
#[derive(Debug, Clone)]
pub struct RunLog {
    pub run_at: DateTime<Utc>,
    pub total_companies: u32,
    pub new_companies: u32,
    pub updated_companies: u32,
    pub delisted_companies: u32,
    pub duration_seconds: i64,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub config_hash: String,
}

/// Aggregate counts over the stored registry
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    pub active_companies: u64,
    pub delisted_companies: u64,
    pub by_market: BTreeMap<String, u64>,
    pub by_shariah_board: BTreeMap<String, u64>,
    pub total_runs: u64,
}

/// Writes one run's records and reconciliation delta to the store
///
/// Every current record is upserted (which reactivates it), the delta's
/// codes get history entries, and delisted companies are deactivated.
/// Records beyond the first occurrence of a code overwrite the earlier
/// upsert only at the field level; history is driven by the delta alone.
pub fn apply_delta<S: Store>(
    store: &mut S,
    records: &[CompanyRecord],
    delta: &ReconciliationDelta,
) -> StoreResult<()> {
    for record in records {
        store.upsert_company(record)?;
    }

    for code in &delta.new {
        store.record_history(code, ChangeType::New, None)?;
    }
    for update in &delta.updated {
        let details = update.changes.join("; ");
        store.record_history(&update.company_code, ChangeType::Updated, Some(&details))?;
    }
    for code in &delta.delisted {
        store.mark_delisted(code)?;
        store.record_history(code, ChangeType::Delisted, None)?;
    }

    Ok(())
}
