//! Export module for writing harvest results to disk
//!
//! This module handles:
//! - JSON exports (flat, hierarchical, per-market, per-board)
//! - CSV exports (full and per-market)
//! - Printing registry statistics to stdout

mod csv;
mod json;
pub mod stats;

pub use csv::{export_csv, export_csv_by_market};
pub use json::{export_by_board, export_by_market, export_flat, export_hierarchical};
pub use stats::print_statistics;

use crate::model::CompanyRecord;
use crate::Result;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::info;

/// Which export files a run should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    All,
}

impl ExportFormat {
    pub fn from_cli_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Writes all requested export files for one run's records
///
/// Filenames carry a shared timestamp so one run's files sort together.
pub fn write_exports(dir: &Path, records: &[CompanyRecord], format: ExportFormat) -> Result<()> {
    fs::create_dir_all(dir)?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();

    if matches!(format, ExportFormat::Json | ExportFormat::All) {
        export_flat(dir, &stamp, records)?;
        export_hierarchical(dir, &stamp, records)?;
        export_by_market(dir, &stamp, records)?;
        export_by_board(dir, &stamp, records)?;
    }
    if matches!(format, ExportFormat::Csv | ExportFormat::All) {
        export_csv(dir, &stamp, records)?;
        export_csv_by_market(dir, &stamp, records)?;
    }

    info!("Exports written to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_cli_name() {
        assert_eq!(ExportFormat::from_cli_name("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_cli_name("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_cli_name("all"), Some(ExportFormat::All));
        assert_eq!(ExportFormat::from_cli_name("xml"), None);
    }
}
