use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistEntry {
    /// Title exactly as the source displays it, possibly with a trailing year
    /// ("Parasite (2019)").
    pub display_title: String,
    pub year: Option<u32>,
    /// Stable path segment from the source; unique within one fetched
    /// watchlist and used as the dedup key.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}
