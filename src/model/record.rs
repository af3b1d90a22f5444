//! Canonical company record and market enumeration

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Arabic label of the main market
pub const TASI_LABEL: &str = "تاسي";

/// Arabic label of the parallel market
pub const NOMU_LABEL: &str = "نمو";

/// Classification applied to every certified record unless overridden
pub const COMPLIANT_CLASSIFICATION: &str = "شرعي";

/// The exchange segments a company can be listed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// TASI, the main market (site market id 3)
    Tasi,
    /// Nomu, the parallel market (site market id 14)
    Nomu,
}

impl Market {
    /// Site market id used in listing addresses for TASI
    pub const TASI_ID: u32 = 3;

    /// Site market id used in listing addresses for Nomu
    pub const NOMU_ID: u32 = 14;

    /// Maps a site market id to a market, when it names one
    pub fn from_market_id(id: u32) -> Option<Self> {
        match id {
            Self::TASI_ID => Some(Self::Tasi),
            Self::NOMU_ID => Some(Self::Nomu),
            _ => None,
        }
    }

    /// Infers the market from a company code when the crawl unit does not
    /// pin one down.
    ///
    /// Codes starting with '4' or numerically at/above 9000 belong to Nomu;
    /// everything else is TASI. This mirrors the source's observed numbering
    /// and has no confirmed specification, so treat it as a heuristic.
    pub fn infer_from_code(code: &str) -> Self {
        let above_threshold = code.parse::<u32>().map(|n| n >= 9000).unwrap_or(false);
        if code.starts_with('4') || above_threshold {
            Self::Nomu
        } else {
            Self::Tasi
        }
    }

    /// The Arabic display label, also used for storage and export
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tasi => TASI_LABEL,
            Self::Nomu => NOMU_LABEL,
        }
    }

    /// Parses a market from its stored label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            TASI_LABEL => Some(Self::Tasi),
            NOMU_LABEL => Some(Self::Nomu),
            _ => None,
        }
    }

    /// Parses a market from a CLI-friendly name
    pub fn from_cli_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tasi" | TASI_LABEL => Some(Self::Tasi),
            "nomu" | NOMU_LABEL => Some(Self::Nomu),
            _ => None,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Market {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The canonical, normalized representation of one certified company as
/// seen through one certifying board.
///
/// A record is only constructed when both `company_code` and `company_name`
/// are non-empty; the row extractor rejects anything else.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    /// Short numeric identifier, unique per company within a market
    pub company_code: String,

    /// Normalized Arabic display name
    pub company_name: String,

    /// Ticker symbol; defaults to the company code when no distinct symbol
    /// is observed
    pub ticker_symbol: String,

    /// The exchange segment this company is listed on
    pub market: Market,

    /// The certifying board under which this record was found
    pub shariah_board: String,

    /// Sector label, present only when a configured keyword matched
    pub sector: Option<String>,

    /// Subsector label, rarely present in the listing tables
    pub subsector: Option<String>,

    /// Compliance classification, defaulting to the compliant sentinel
    pub classification: String,

    /// Purification amount per share in riyal, when a bounded decimal cell
    /// was observed
    pub purification_amount: Option<f64>,

    /// Time of extraction
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_from_id() {
        assert_eq!(Market::from_market_id(3), Some(Market::Tasi));
        assert_eq!(Market::from_market_id(14), Some(Market::Nomu));
        assert_eq!(Market::from_market_id(0), None);
    }

    #[test]
    fn test_infer_leading_four_is_nomu() {
        assert_eq!(Market::infer_from_code("4100"), Market::Nomu);
    }

    #[test]
    fn test_infer_threshold_is_nomu() {
        assert_eq!(Market::infer_from_code("9510"), Market::Nomu);
        assert_eq!(Market::infer_from_code("9000"), Market::Nomu);
    }

    #[test]
    fn test_infer_default_is_tasi() {
        assert_eq!(Market::infer_from_code("1111"), Market::Tasi);
        assert_eq!(Market::infer_from_code("8999"), Market::Tasi);
    }

    #[test]
    fn test_infer_is_deterministic() {
        for code in ["1010", "4002", "9600", "2222"] {
            assert_eq!(Market::infer_from_code(code), Market::infer_from_code(code));
        }
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(Market::from_label(Market::Tasi.label()), Some(Market::Tasi));
        assert_eq!(Market::from_label(Market::Nomu.label()), Some(Market::Nomu));
        assert_eq!(Market::from_label("unknown"), None);
    }

    #[test]
    fn test_cli_names() {
        assert_eq!(Market::from_cli_name("TASI"), Some(Market::Tasi));
        assert_eq!(Market::from_cli_name("nomu"), Some(Market::Nomu));
        assert_eq!(Market::from_cli_name("main"), None);
    }
}
