//! Cross-unit deduplication
//!
//! The same (company, board) observation can surface more than once, e.g.
//! when a pagination control re-serves a page. The dedup key is the
//! composite (company code, board name): one certifying board's view of a
//! company is authoritative, so the first occurrence establishes the entry
//! and later ones are dropped entirely. A company certified by two
//! different boards legitimately keeps one entry per board.

use crate::model::CompanyRecord;
use std::collections::HashSet;

/// Collapses duplicate (code, board) observations, keeping encounter order
///
/// First-seen-wins and deterministic: the outcome depends only on the input
/// order, and re-running on its own output is a no-op.
pub fn dedup_records(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(records.len());
    let mut canonical = Vec::with_capacity(records.len());

    for record in records {
        let key = (record.company_code.clone(), record.shariah_board.clone());
        if seen.insert(key) {
            canonical.push(record);
        } else {
            tracing::trace!(
                "Dropping duplicate observation of {} via {}",
                record.company_code,
                record.shariah_board
            );
        }
    }

    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::COMPLIANT_CLASSIFICATION;
    use crate::model::Market;
    use chrono::Utc;

    fn record(code: &str, name: &str, board: &str) -> CompanyRecord {
        CompanyRecord {
            company_code: code.to_string(),
            company_name: name.to_string(),
            ticker_symbol: code.to_string(),
            market: Market::infer_from_code(code),
            shariah_board: board.to_string(),
            sector: None,
            subsector: None,
            classification: COMPLIANT_CLASSIFICATION.to_string(),
            purification_amount: None,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let records = vec![
            record("9510", "Company A", "board"),
            record("9510", "Company A", "board"),
        ];
        let canonical = dedup_records(records);
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0].company_code, "9510");
    }

    #[test]
    fn test_first_seen_wins() {
        let records = vec![
            record("1111", "الاسم الأول", "board"),
            record("1111", "الاسم الثاني", "board"),
        ];
        let canonical = dedup_records(records);
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0].company_name, "الاسم الأول");
    }

    #[test]
    fn test_same_company_two_boards_kept() {
        let records = vec![
            record("1111", "شركة", "الراجحي المالية"),
            record("1111", "شركة", "البلاد المالية"),
        ];
        let canonical = dedup_records(records);
        assert_eq!(canonical.len(), 2);
    }

    #[test]
    fn test_order_preserved() {
        let records = vec![
            record("2222", "ب", "board"),
            record("1111", "أ", "board"),
            record("3333", "ج", "board"),
        ];
        let canonical = dedup_records(records);
        let codes: Vec<_> = canonical.iter().map(|r| r.company_code.as_str()).collect();
        assert_eq!(codes, vec!["2222", "1111", "3333"]);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            record("1111", "أ", "b1"),
            record("1111", "أ", "b1"),
            record("2222", "ب", "b2"),
        ];
        let once = dedup_records(records);
        let twice = dedup_records(once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.company_code, b.company_code);
            assert_eq!(a.shariah_board, b.shariah_board);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_records(Vec::new()).is_empty());
    }
}
