//! Classification of canonical records into the market/board hierarchy
//!
//! Pure projections over the canonical record list: nothing here mutates
//! the input, and the index is rebuilt from scratch on each export rather
//! than persisted.

use crate::model::{CompanyRecord, Market};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket label for records whose board name is empty
pub const UNSPECIFIED_BOARD: &str = "غير محدد";

/// Two-level read-only index: market -> board -> records
#[derive(Debug, Clone, Serialize)]
pub struct HierarchicalIndex {
    /// Total number of records across all markets
    pub total_companies: usize,

    /// Per-market buckets keyed by market label
    pub markets: BTreeMap<String, MarketBucket>,
}

/// One market's slice of the index
#[derive(Debug, Clone, Serialize)]
pub struct MarketBucket {
    /// Records in this market
    pub total: usize,

    /// Records grouped by certifying board
    pub by_shariah_board: BTreeMap<String, Vec<CompanyRecord>>,
}

/// Flat counts over the canonical record list
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_companies: usize,
    pub by_market: BTreeMap<String, usize>,
    pub by_shariah_board: BTreeMap<String, usize>,
    pub by_sector: BTreeMap<String, usize>,
}

/// Builds the two-level hierarchy from the canonical record list
///
/// First pass buckets by market, second pass buckets each market by board.
/// Records with an empty board name land under the unspecified sentinel.
pub fn build_index(records: &[CompanyRecord]) -> HierarchicalIndex {
    let mut markets: BTreeMap<String, MarketBucket> = BTreeMap::new();

    for record in records {
        let bucket = markets
            .entry(record.market.label().to_string())
            .or_insert_with(|| MarketBucket {
                total: 0,
                by_shariah_board: BTreeMap::new(),
            });

        bucket.total += 1;
        bucket
            .by_shariah_board
            .entry(board_key(record))
            .or_default()
            .push(record.clone());
    }

    HierarchicalIndex {
        total_companies: records.len(),
        markets,
    }
}

/// Computes flat counts by market, board, and sector in one pass
pub fn statistics(records: &[CompanyRecord]) -> Statistics {
    let mut stats = Statistics {
        total_companies: records.len(),
        ..Statistics::default()
    };

    for record in records {
        *stats
            .by_market
            .entry(record.market.label().to_string())
            .or_insert(0) += 1;
        *stats.by_shariah_board.entry(board_key(record)).or_insert(0) += 1;
        if let Some(sector) = &record.sector {
            *stats.by_sector.entry(sector.clone()).or_insert(0) += 1;
        }
    }

    stats
}

/// Filters records by market and/or board without mutating the input
pub fn filter_records(
    records: &[CompanyRecord],
    market: Option<Market>,
    board: Option<&str>,
) -> Vec<CompanyRecord> {
    records
        .iter()
        .filter(|r| market.map_or(true, |m| r.market == m))
        .filter(|r| board.map_or(true, |b| r.shariah_board == b))
        .cloned()
        .collect()
}

fn board_key(record: &CompanyRecord) -> String {
    if record.shariah_board.trim().is_empty() {
        UNSPECIFIED_BOARD.to_string()
    } else {
        record.shariah_board.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::COMPLIANT_CLASSIFICATION;
    use chrono::Utc;

    fn record(code: &str, board: &str, sector: Option<&str>) -> CompanyRecord {
        CompanyRecord {
            company_code: code.to_string(),
            company_name: format!("شركة {}", code),
            ticker_symbol: code.to_string(),
            market: Market::infer_from_code(code),
            shariah_board: board.to_string(),
            sector: sector.map(String::from),
            subsector: None,
            classification: COMPLIANT_CLASSIFICATION.to_string(),
            purification_amount: None,
            observed_at: Utc::now(),
        }
    }

    fn sample() -> Vec<CompanyRecord> {
        vec![
            record("1111", "الراجحي المالية", Some("البنوك")),
            record("2222", "الراجحي المالية", None),
            record("9510", "البلاد المالية", Some("البنوك")),
            record("4100", "البلاد المالية", Some("العقار")),
        ]
    }

    #[test]
    fn test_market_totals_sum_to_overall() {
        let index = build_index(&sample());
        let sum: usize = index.markets.values().map(|m| m.total).sum();
        assert_eq!(sum, index.total_companies);
        assert_eq!(index.total_companies, 4);
    }

    #[test]
    fn test_board_totals_sum_per_market() {
        let index = build_index(&sample());
        for bucket in index.markets.values() {
            let sum: usize = bucket.by_shariah_board.values().map(|v| v.len()).sum();
            assert_eq!(sum, bucket.total);
        }
    }

    #[test]
    fn test_bucketing_by_market() {
        let index = build_index(&sample());
        assert_eq!(index.markets[Market::Tasi.label()].total, 2);
        assert_eq!(index.markets[Market::Nomu.label()].total, 2);
    }

    #[test]
    fn test_empty_board_goes_to_sentinel() {
        let records = vec![record("1111", "", None)];
        let index = build_index(&records);
        let tasi = &index.markets[Market::Tasi.label()];
        assert!(tasi.by_shariah_board.contains_key(UNSPECIFIED_BOARD));
    }

    #[test]
    fn test_statistics_counts() {
        let stats = statistics(&sample());
        assert_eq!(stats.total_companies, 4);
        assert_eq!(stats.by_market[Market::Tasi.label()], 2);
        assert_eq!(stats.by_market[Market::Nomu.label()], 2);
        assert_eq!(stats.by_shariah_board["الراجحي المالية"], 2);
        assert_eq!(stats.by_sector["البنوك"], 2);
        assert_eq!(stats.by_sector.get("العقار"), Some(&1));
    }

    #[test]
    fn test_statistics_does_not_mutate_input() {
        let records = sample();
        let before: Vec<_> = records.iter().map(|r| r.company_code.clone()).collect();
        let _ = statistics(&records);
        let _ = build_index(&records);
        let after: Vec<_> = records.iter().map(|r| r.company_code.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filter_by_market() {
        let filtered = filter_records(&sample(), Some(Market::Nomu), None);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.market == Market::Nomu));
    }

    #[test]
    fn test_filter_by_board() {
        let filtered = filter_records(&sample(), None, Some("البلاد المالية"));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_combined() {
        let filtered = filter_records(&sample(), Some(Market::Tasi), Some("الراجحي المالية"));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let index = build_index(&[]);
        assert_eq!(index.total_companies, 0);
        assert!(index.markets.is_empty());
    }
}
