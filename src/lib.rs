//! Sanad: a harvester of Shariah-certified listings
//!
//! This crate crawls the certified-company listings of the Saudi exchange,
//! one certifying board at a time, normalizes the heterogeneous table rows
//! into canonical company records, deduplicates across boards, classifies
//! the result into a market/board hierarchy, and reconciles it against the
//! previously persisted state (new / updated / delisted companies).

pub mod config;
pub mod export;
pub mod harvest;
pub mod model;
pub mod pipeline;
pub mod schedule;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for Sanad operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A harvest run is already in progress")]
    RunInProgress,

    #[error("Scheduler is not running")]
    SchedulerStopped,
}

/// Errors raised by the rendered-page source (the navigation session)
#[derive(Debug, Error)]
pub enum SourceError {
    /// The session could not be acquired at all. Never retried.
    #[error("Navigation session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Page load timed out for {url}")]
    Timeout { url: String },

    #[error("Stale page content at {url}: {message}")]
    Stale { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Request failed for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Invalid listing address: {0}")]
    Address(#[from] url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sanad operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CompanyRecord, CrawlUnit, Market, MarketFilter, RunStatistics, RunStatus};
