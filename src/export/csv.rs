//! CSV exporters
//!
//! Columns are written explicitly rather than through serde so the header
//! order stays stable regardless of struct field order.

use crate::model::{CompanyRecord, Market};
use crate::pipeline::filter_records;
use crate::Result;
use std::path::Path;

const HEADER: [&str; 9] = [
    "company_code",
    "company_name",
    "ticker_symbol",
    "market",
    "shariah_board",
    "sector",
    "subsector",
    "classification",
    "purification_amount",
];

fn write_csv(path: &Path, records: &[&CompanyRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    for record in records {
        let purification = record
            .purification_amount
            .map(|v| v.to_string())
            .unwrap_or_default();
        writer.write_record([
            record.company_code.as_str(),
            record.company_name.as_str(),
            record.ticker_symbol.as_str(),
            record.market.label(),
            record.shariah_board.as_str(),
            record.sector.as_deref().unwrap_or(""),
            record.subsector.as_deref().unwrap_or(""),
            record.classification.as_str(),
            purification.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes all records into one CSV file
pub fn export_csv(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    let refs: Vec<&CompanyRecord> = records.iter().collect();
    write_csv(&dir.join(format!("companies_{stamp}.csv")), &refs)
}

/// Writes one CSV file per market
pub fn export_csv_by_market(dir: &Path, stamp: &str, records: &[CompanyRecord]) -> Result<()> {
    for (market, file_tag) in [(Market::Tasi, "tasi"), (Market::Nomu, "nomu")] {
        let subset = filter_records(records, Some(market), None);
        let refs: Vec<&CompanyRecord> = subset.iter().collect();
        write_csv(&dir.join(format!("companies_{file_tag}_{stamp}.csv")), &refs)?;
    }
    Ok(())
}
