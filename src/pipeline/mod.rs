//! Post-harvest processing: deduplication, classification, reconciliation

pub mod classify;
pub mod dedup;
pub mod reconcile;

pub use classify::{build_index, filter_records, statistics, HierarchicalIndex, Statistics};
pub use dedup::dedup_records;
pub use reconcile::{reconcile, CompanyUpdate, ReconciliationDelta};
