//! JSON exporters
//!
//! Every JSON file carries a small metadata header identifying when it was
//! generated and by which version, so downstream consumers can tell stale
//! exports apart.

use crate::model::{CompanyRecord, Market};
use crate::pipeline::{build_index, filter_records, HierarchicalIndex};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Metadata header attached to every JSON export
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub generated_at: String,
    pub source: &'static str,
    pub version: &'static str,
}

impl ExportMetadata {
    fn now() -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: "argaam.com",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Serialize)]
struct FlatExport<'a> {
    metadata: ExportMetadata,
    total_companies: usize,
    companies: &'a [CompanyRecord],
}

#[derive(Serialize)]
struct HierarchicalExport {
    metadata: ExportMetadata,
    #[serde(flatten)]
    index: HierarchicalIndex,
}

#[derive(Serialize)]
struct GroupedExport<'a> {
    metadata: ExportMetadata,
    total_companies: usize,
    groups: BTreeMap<&'a str, Vec<&'a CompanyRecord>>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Writes the full record list as one flat JSON array with metadata
pub fn export_flat(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    let export = FlatExport {
        metadata: ExportMetadata::now(),
        total_companies: records.len(),
        companies: records,
    };
    write_json(&dir.join(format!("companies_{stamp}.json")), &export)
}

/// Writes the market -> board -> companies hierarchy
pub fn export_hierarchical(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    let export = HierarchicalExport {
        metadata: ExportMetadata::now(),
        index: build_index(records),
    };
    write_json(
        &dir.join(format!("companies_hierarchical_{stamp}.json")),
        &export,
    )
}

/// Writes one flat file per market
pub fn export_by_market(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    for (market, file_tag) in [(Market::Tasi, "tasi"), (Market::Nomu, "nomu")] {
        let subset = filter_records(records, Some(market), None);
        let export = FlatExport {
            metadata: ExportMetadata::now(),
            total_companies: subset.len(),
            companies: &subset,
        };
        write_json(
            &dir.join(format!("companies_{file_tag}_{stamp}.json")),
            &export,
        )?;
    }
    Ok(())
}

/// Writes all records grouped by certifying board into one file
pub fn export_by_board(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    let mut groups: BTreeMap<&str, Vec<&CompanyRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.shariah_board.as_str())
            .or_default()
            .push(record);
    }
    let export = GroupedExport {
        metadata: ExportMetadata::now(),
        total_companies: records.len(),
        groups,
    };
    write_json(
        &dir.join(format!("companies_by_board_{stamp}.json")),
        &export,
    )
}
