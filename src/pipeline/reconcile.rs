//! Reconciliation of the current crawl against persisted state
//!
//! A set-and-field diff, not a deep structural comparison: companies are
//! keyed by code, and only the fixed tracked fields (name, market, board,
//! sector) can produce an `updated` classification. The delta is computed
//! once per run, handed to the store, and discarded; the audit history the
//! store writes from it is what endures.

use crate::model::CompanyRecord;
use crate::storage::StoredCompany;
use std::collections::{HashMap, HashSet};

/// Field-level changes detected for one previously known company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyUpdate {
    pub company_code: String,

    /// Human-readable per-field change descriptions
    pub changes: Vec<String>,
}

/// The outcome of diffing one run against the prior active set
#[derive(Debug, Clone, Default)]
pub struct ReconciliationDelta {
    /// Codes seen now but not previously active
    pub new: Vec<String>,

    /// Previously active codes whose tracked fields changed
    pub updated: Vec<CompanyUpdate>,

    /// Previously active codes absent from the current set
    pub delisted: Vec<String>,
}

impl ReconciliationDelta {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.updated.is_empty() && self.delisted.is_empty()
    }
}

/// Diffs the current canonical records against the prior active companies
///
/// When a code appears under several boards, its first canonical occurrence
/// drives the comparison (matching the store, which keys companies by code
/// alone). A code present in the prior set with missing stored fields is
/// compared against the empty values, never treated as an error.
pub fn reconcile(
    current: &[CompanyRecord],
    prior: &HashMap<String, StoredCompany>,
) -> ReconciliationDelta {
    let mut delta = ReconciliationDelta::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in current {
        if !seen.insert(record.company_code.as_str()) {
            continue;
        }

        match prior.get(&record.company_code) {
            None => delta.new.push(record.company_code.clone()),
            Some(stored) => {
                let changes = diff_tracked_fields(record, stored);
                if !changes.is_empty() {
                    delta.updated.push(CompanyUpdate {
                        company_code: record.company_code.clone(),
                        changes,
                    });
                }
            }
        }
    }

    let mut delisted: Vec<String> = prior
        .keys()
        .filter(|code| !seen.contains(code.as_str()))
        .cloned()
        .collect();
    delisted.sort();
    delta.delisted = delisted;

    delta
}

/// Compares the fixed tracked fields, describing each difference
fn diff_tracked_fields(record: &CompanyRecord, stored: &StoredCompany) -> Vec<String> {
    let mut changes = Vec::new();

    if record.company_name != stored.company_name {
        changes.push(format!(
            "name: {} -> {}",
            stored.company_name, record.company_name
        ));
    }
    if record.market.label() != stored.market {
        changes.push(format!("market: {} -> {}", stored.market, record.market));
    }
    if record.shariah_board != stored.shariah_board {
        changes.push(format!(
            "shariah board: {} -> {}",
            stored.shariah_board, record.shariah_board
        ));
    }
    let current_sector = record.sector.as_deref().unwrap_or("");
    let stored_sector = stored.sector.as_deref().unwrap_or("");
    if current_sector != stored_sector {
        changes.push(format!("sector: {} -> {}", stored_sector, current_sector));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::COMPLIANT_CLASSIFICATION;
    use crate::model::Market;
    use chrono::Utc;

    fn record(code: &str, name: &str) -> CompanyRecord {
        CompanyRecord {
            company_code: code.to_string(),
            company_name: name.to_string(),
            ticker_symbol: code.to_string(),
            market: Market::infer_from_code(code),
            shariah_board: "الراجحي المالية".to_string(),
            sector: None,
            subsector: None,
            classification: COMPLIANT_CLASSIFICATION.to_string(),
            purification_amount: None,
            observed_at: Utc::now(),
        }
    }

    fn stored(record: &CompanyRecord) -> StoredCompany {
        StoredCompany {
            company_name: record.company_name.clone(),
            market: record.market.label().to_string(),
            shariah_board: record.shariah_board.clone(),
            sector: record.sector.clone(),
        }
    }

    fn prior_of(records: &[CompanyRecord]) -> HashMap<String, StoredCompany> {
        records
            .iter()
            .map(|r| (r.company_code.clone(), stored(r)))
            .collect()
    }

    #[test]
    fn test_identical_sets_yield_empty_delta() {
        let current = vec![record("1111", "أ"), record("2222", "ب")];
        let prior = prior_of(&current);

        let delta = reconcile(&current, &prior);
        assert!(delta.new.is_empty());
        assert!(delta.updated.is_empty());
        assert!(delta.delisted.is_empty());
    }

    #[test]
    fn test_removed_company_is_delisted() {
        let kept = record("1111", "أ");
        let removed = record("2222", "ب");
        let prior = prior_of(&[kept.clone(), removed]);

        let delta = reconcile(&[kept], &prior);
        assert_eq!(delta.delisted, vec!["2222".to_string()]);
        assert!(delta.new.is_empty());
    }

    #[test]
    fn test_new_updated_delisted_together() {
        // Prior: 1111 and 2222. Current: 2222 renamed, 3333 new.
        let old_2222 = record("2222", "الاسم القديم");
        let prior = prior_of(&[record("1111", "أ"), old_2222]);

        let current = vec![record("2222", "الاسم الجديد"), record("3333", "ج")];
        let delta = reconcile(&current, &prior);

        assert_eq!(delta.new, vec!["3333".to_string()]);
        assert_eq!(delta.delisted, vec!["1111".to_string()]);
        assert_eq!(delta.updated.len(), 1);
        assert_eq!(delta.updated[0].company_code, "2222");
        assert!(delta.updated[0].changes[0].contains("الاسم القديم"));
        assert!(delta.updated[0].changes[0].contains("الاسم الجديد"));
    }

    #[test]
    fn test_market_change_tracked() {
        let mut old = record("1111", "أ");
        old.market = Market::Nomu;
        let prior = prior_of(&[old]);

        let delta = reconcile(&[record("1111", "أ")], &prior);
        assert_eq!(delta.updated.len(), 1);
        assert!(delta.updated[0].changes[0].starts_with("market:"));
    }

    #[test]
    fn test_sector_appearing_is_an_update() {
        let old = record("1111", "أ");
        let prior = prior_of(&[old]);

        let mut current = record("1111", "أ");
        current.sector = Some("البنوك".to_string());
        let delta = reconcile(&[current], &prior);
        assert_eq!(delta.updated.len(), 1);
    }

    #[test]
    fn test_missing_prior_fields_compared_as_empty() {
        let prior: HashMap<String, StoredCompany> = [(
            "1111".to_string(),
            StoredCompany {
                company_name: String::new(),
                market: String::new(),
                shariah_board: String::new(),
                sector: None,
            },
        )]
        .into_iter()
        .collect();

        let delta = reconcile(&[record("1111", "أ")], &prior);
        // Not new, not delisted: just updated from the empty prior values
        assert!(delta.new.is_empty());
        assert!(delta.delisted.is_empty());
        assert_eq!(delta.updated.len(), 1);
    }

    #[test]
    fn test_duplicate_code_uses_first_occurrence() {
        let first = record("1111", "أ");
        let mut second = record("1111", "أ");
        second.shariah_board = "البلاد المالية".to_string();
        let prior = prior_of(&[first.clone()]);

        let delta = reconcile(&[first, second], &prior);
        assert!(delta.is_empty());
    }

    #[test]
    fn test_empty_prior_state_all_new() {
        let current = vec![record("1111", "أ"), record("2222", "ب")];
        let delta = reconcile(&current, &HashMap::new());
        assert_eq!(delta.new.len(), 2);
        assert!(delta.updated.is_empty());
        assert!(delta.delisted.is_empty());
    }
}
