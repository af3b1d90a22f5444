//! Row extraction: raw table cells to canonical records
//!
//! The listing tables come in several column layouts, so extraction is a
//! fixed, ordered list of heuristics applied to a draft that only ever
//! fills empty fields. First match wins; nothing is overwritten. Malformed
//! rows are a normal case and yield no record, never an error.

use crate::model::record::COMPLIANT_CLASSIFICATION;
use crate::model::{CompanyRecord, CrawlUnit, Market};
use crate::text::{is_arabic, normalize_arabic};
use chrono::Utc;

/// Partially extracted fields; rules fill, never overwrite
#[derive(Debug, Default)]
struct Draft {
    code: Option<String>,
    code_cell: Option<usize>,
    name: Option<String>,
    name_cell: Option<usize>,
    sector: Option<String>,
    purification: Option<f64>,
}

/// Extracts a candidate record from one row of text cells
///
/// Returns `None` when the row cannot yield a valid record: no cells, or no
/// company code / name after all rules ran.
pub fn extract_record(
    cells: &[String],
    unit: &CrawlUnit,
    sector_keywords: &[String],
) -> Option<CompanyRecord> {
    if cells.is_empty() {
        return None;
    }

    let mut draft = Draft::default();

    apply_code_rule(&mut draft, cells);
    apply_name_rule(&mut draft, cells);
    apply_scan_rules(&mut draft, cells, sector_keywords);

    let code = draft.code?;
    let name = draft.name.filter(|n| !n.is_empty())?;

    let market = unit
        .market()
        .unwrap_or_else(|| Market::infer_from_code(&code));

    Some(CompanyRecord {
        ticker_symbol: code.clone(),
        company_code: code,
        company_name: name,
        market,
        shariah_board: unit.board_name.clone(),
        sector: draft.sector,
        subsector: None,
        classification: COMPLIANT_CLASSIFICATION.to_string(),
        purification_amount: draft.purification,
        observed_at: Utc::now(),
    })
}

/// Rule 1: cell 0 when entirely numeric, else the first 4-digit cell
fn apply_code_rule(draft: &mut Draft, cells: &[String]) {
    let first = &cells[0];
    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        draft.code = Some(first.clone());
        draft.code_cell = Some(0);
        return;
    }

    for (i, cell) in cells.iter().enumerate() {
        if cell.len() == 4 && cell.chars().all(|c| c.is_ascii_digit()) {
            draft.code = Some(cell.clone());
            draft.code_cell = Some(i);
            return;
        }
    }
}

/// Rule 2: cell 1 when non-empty, else the first Arabic-bearing cell
fn apply_name_rule(draft: &mut Draft, cells: &[String]) {
    if let Some(second) = cells.get(1) {
        if !second.is_empty() && draft.code_cell != Some(1) {
            draft.name = Some(normalize_arabic(second));
            draft.name_cell = Some(1);
            return;
        }
    }

    for (i, cell) in cells.iter().enumerate() {
        if draft.code_cell == Some(i) {
            continue;
        }
        if is_arabic(cell) {
            draft.name = Some(normalize_arabic(cell));
            draft.name_cell = Some(i);
            return;
        }
    }
}

/// Rules 3 and 4: one ordered pass over the remaining cells
///
/// A decimal cell parsing into [0, 100] becomes the purification amount; a
/// cell containing a configured keyword becomes the sector. Each cell feeds
/// at most one field, and each field keeps its first match. Parse failures
/// are swallowed; this step is best-effort.
fn apply_scan_rules(draft: &mut Draft, cells: &[String], sector_keywords: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if draft.code_cell == Some(i) || draft.name_cell == Some(i) || cell.is_empty() {
            continue;
        }

        if draft.purification.is_none() && cell.contains('.') {
            if let Ok(amount) = cell.parse::<f64>() {
                if (0.0..=100.0).contains(&amount) {
                    draft.purification = Some(amount);
                    continue;
                }
            }
        }

        if draft.sector.is_none() && sector_keywords.iter().any(|k| cell.contains(k.as_str())) {
            draft.sector = Some(cell.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with_market(market_id: u32) -> CrawlUnit {
        CrawlUnit::new(1, "الراجحي المالية", market_id)
    }

    fn keywords() -> Vec<String> {
        vec![
            "العقار".to_string(),
            "البنوك".to_string(),
            "التأمين".to_string(),
            "الصناعة".to_string(),
        ]
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_layout() {
        let record = extract_record(
            &cells(&["1111", "شركة الأولى", "قطاع البنوك", "2.50"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();

        assert_eq!(record.company_code, "1111");
        assert_eq!(record.ticker_symbol, "1111");
        assert_eq!(record.company_name, "شركة الأولى");
        assert_eq!(record.market, Market::Tasi);
        assert_eq!(record.sector.as_deref(), Some("قطاع البنوك"));
        assert_eq!(record.purification_amount, Some(2.5));
        assert_eq!(record.classification, COMPLIANT_CLASSIFICATION);
        assert_eq!(record.shariah_board, "الراجحي المالية");
    }

    #[test]
    fn test_code_found_by_scan() {
        // Code not in cell 0; the 4-digit cell further right is used
        let record = extract_record(
            &cells(&["", "شركة الأولى", "1010"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.company_code, "1010");
    }

    #[test]
    fn test_name_found_by_arabic_scan() {
        let record = extract_record(
            &cells(&["1111", "", "شركة الأولى"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.company_name, "شركة الأولى");
    }

    #[test]
    fn test_name_is_normalized() {
        let record = extract_record(
            &cells(&["1111", "  شَركة   الأولى "]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.company_name, "شركة الأولى");
    }

    #[test]
    fn test_empty_row_rejected() {
        assert!(extract_record(&[], &unit_with_market(3), &keywords()).is_none());
    }

    #[test]
    fn test_row_without_code_rejected() {
        let result = extract_record(
            &cells(&["", "شركة بلا رمز"]),
            &unit_with_market(3),
            &keywords(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_row_without_name_rejected() {
        let result = extract_record(&cells(&["1111", ""]), &unit_with_market(3), &keywords());
        assert!(result.is_none());
    }

    #[test]
    fn test_market_from_unit_overrides_code() {
        // 4xxx would infer Nomu, but the unit pins TASI
        let record = extract_record(
            &cells(&["4100", "شركة"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.market, Market::Tasi);
    }

    #[test]
    fn test_market_inferred_when_unit_unpinned() {
        let record = extract_record(
            &cells(&["4100", "شركة"]),
            &unit_with_market(0),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.market, Market::Nomu);
    }

    #[test]
    fn test_purification_first_match_wins() {
        let record = extract_record(
            &cells(&["1111", "شركة", "3.25", "7.50"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.purification_amount, Some(3.25));
    }

    #[test]
    fn test_purification_out_of_range_ignored() {
        let record = extract_record(
            &cells(&["1111", "شركة", "250.75"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.purification_amount, None);
    }

    #[test]
    fn test_unparseable_decimal_swallowed() {
        let record = extract_record(
            &cells(&["1111", "شركة", "1.2.3"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.purification_amount, None);
    }

    #[test]
    fn test_sector_requires_keyword() {
        let record = extract_record(
            &cells(&["1111", "شركة", "نشاط آخر"]),
            &unit_with_market(3),
            &keywords(),
        )
        .unwrap();
        assert_eq!(record.sector, None);
    }
}
