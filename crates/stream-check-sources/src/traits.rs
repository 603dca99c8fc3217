use async_trait::async_trait;
use stream_check_models::TitleCandidate;

use crate::error::SourceError;

/// Boundary to the watchlist site: retrieve one page of raw watchlist HTML.
///
/// Stateless request/response with no control flow of its own, so the core
/// can be tested against in-memory fakes.
#[async_trait]
pub trait WatchlistFetcher: Send + Sync {
    /// Fetch the raw HTML of `username`'s watchlist page `page` (1-based).
    /// A non-2xx response is a `Transport` failure, never a last-page signal.
    async fn fetch_page(&self, username: &str, page: u32) -> Result<String, SourceError>;
}

/// Boundary to the availability aggregator: search offers for one title.
#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    /// Query candidates for a normalized title key, preserving the
    /// aggregator's relevance order.
    async fn query(&self, key: &str) -> Result<Vec<TitleCandidate>, SourceError>;
}
