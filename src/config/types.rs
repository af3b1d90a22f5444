use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sanad
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub board: Vec<BoardEntry>,
}

/// Harvest traversal behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Hard ceiling on pages traversed per crawl unit, against misbehaving
    /// pagination controls
    #[serde(rename = "max-pages-per-unit", default = "default_max_pages")]
    pub max_pages_per_unit: u32,

    /// Delay between boards (milliseconds), respecting the source's rate
    /// tolerance
    #[serde(rename = "inter-board-delay", default = "default_inter_board_delay")]
    pub inter_board_delay_ms: u64,

    /// Timeout for a single page load (seconds)
    #[serde(rename = "page-timeout", default = "default_page_timeout")]
    pub page_timeout_secs: u64,
}

impl HarvestConfig {
    pub fn inter_board_delay(&self) -> Duration {
        Duration::from_millis(self.inter_board_delay_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

/// The external listing source
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base address of the by-board certified listings
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent presented to the source
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Keywords that positively identify a sector cell
    #[serde(rename = "sector-keywords", default = "default_sector_keywords")]
    pub sector_keywords: Vec<String>,
}

/// Retry policy applied to page loads
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per step before the failure escalates
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "delay", default = "default_retry_delay")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory receiving JSON/CSV exports
    #[serde(rename = "export-dir")]
    pub export_dir: String,
}

/// Scheduled harvesting
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Hours between scheduled harvest runs
    #[serde(rename = "interval-hours", default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
        }
    }
}

/// One certifying board whose filtered listing is crawled independently
#[derive(Debug, Clone, Deserialize)]
pub struct BoardEntry {
    /// The board's numeric id on the listing site
    pub id: u32,

    /// Arabic display name
    pub name: String,

    /// English name, informational only
    #[serde(rename = "name-en", default)]
    pub name_en: Option<String>,
}

fn default_max_pages() -> u32 {
    20
}

fn default_inter_board_delay() -> u64 {
    2000
}

fn default_page_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_interval_hours() -> u64 {
    24
}

fn default_user_agent() -> String {
    format!("sanad/{}", env!("CARGO_PKG_VERSION"))
}

fn default_sector_keywords() -> Vec<String> {
    ["العقار", "البنوك", "التأمين", "الصناعة"]
        .into_iter()
        .map(String::from)
        .collect()
}
