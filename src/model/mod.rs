//! Core data model: markets, canonical records, crawl units, run statistics

pub mod record;
pub mod stats;
pub mod unit;

pub use record::{CompanyRecord, Market};
pub use stats::{RunStatistics, RunStatus};
pub use unit::{CrawlUnit, MarketFilter};
