use serde::{Deserialize, Serialize};

use crate::offer::AvailabilityOffer;
use crate::watchlist::WatchlistEntry;

/// Output unit: one watchlist entry with the offers that survived service
/// filtering. `offers` empty with `lookup_failed` false means "looked up,
/// not available on the selected services"; with `lookup_failed` true the
/// availability is unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchedResult {
    pub entry: WatchlistEntry,
    pub offers: Vec<AvailabilityOffer>,
    #[serde(default)]
    pub lookup_failed: bool,
    /// Poster from the watchlist page when it had one, otherwise the
    /// aggregator's poster for the matched candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl MatchedResult {
    pub fn is_available(&self) -> bool {
        !self.offers.is_empty()
    }
}

/// Run-level metadata emitted alongside the result list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub pages_fetched: u32,
    pub entries_total: usize,
    pub queries_failed: usize,
    /// True when a page-level failure stopped pagination early; the results
    /// cover only the pages fetched before the failure.
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutcome {
    pub results: Vec<MatchedResult>,
    pub report: RunReport,
}
