//! Crawl units and market filtering

use crate::model::Market;
use url::Url;

/// One (certifying board, market) pair driving one paginated traversal
///
/// Units are immutable; the orchestrator generates them as the cross product
/// of the configured boards and the requested market filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlUnit {
    /// The board's numeric id on the listing site
    pub board_id: u32,

    /// The board's Arabic display name
    pub board_name: String,

    /// The site market id this traversal is filtered to
    pub market_id: u32,
}

impl CrawlUnit {
    pub fn new(board_id: u32, board_name: impl Into<String>, market_id: u32) -> Self {
        Self {
            board_id,
            board_name: board_name.into(),
            market_id,
        }
    }

    /// The market this unit is pinned to, when the market id names one
    pub fn market(&self) -> Option<Market> {
        Market::from_market_id(self.market_id)
    }

    /// Builds the deterministic listing address for this unit
    ///
    /// The address is `{base}/{board_id}?marketid={market_id}`.
    pub fn address(&self, base: &Url) -> Result<Url, url::ParseError> {
        let joined = format!(
            "{}/{}?marketid={}",
            base.as_str().trim_end_matches('/'),
            self.board_id,
            self.market_id
        );
        Url::parse(&joined)
    }
}

/// Which market(s) a harvest run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketFilter {
    /// Harvest both TASI and Nomu
    All,
    /// Harvest a single market
    One(Market),
}

impl MarketFilter {
    /// The site market ids this filter expands to, in traversal order
    pub fn market_ids(&self) -> Vec<u32> {
        match self {
            Self::All => vec![Market::TASI_ID, Market::NOMU_ID],
            Self::One(Market::Tasi) => vec![Market::TASI_ID],
            Self::One(Market::Nomu) => vec![Market::NOMU_ID],
        }
    }
}

impl Default for MarketFilter {
    fn default() -> Self {
        Self::All
    }
}
