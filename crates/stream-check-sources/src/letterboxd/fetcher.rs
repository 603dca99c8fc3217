use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::WatchlistFetcher;

const DEFAULT_BASE_URL: &str = "https://letterboxd.com";

// The site serves an empty shell to clients without a browser user agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP fetcher for watchlist pages. Pure passthrough: one GET per page,
/// error-code forwarding, no interpretation of the body.
pub struct LetterboxdFetcher {
    client: Client,
    base_url: String,
}

impl LetterboxdFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the fetcher at a different host (local fixture server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for LetterboxdFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatchlistFetcher for LetterboxdFetcher {
    async fn fetch_page(&self, username: &str, page: u32) -> Result<String, SourceError> {
        let url = format!("{}/{}/watchlist/page/{}/", self.base_url, username, page);
        debug!(%url, "fetching watchlist page");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::transport(
                Some(status.as_u16()),
                format!("watchlist page {page} for {username} rejected"),
            ));
        }

        response.text().await.map_err(SourceError::from)
    }
}
