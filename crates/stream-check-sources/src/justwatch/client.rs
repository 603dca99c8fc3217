use async_trait::async_trait;
use reqwest::Client;
use stream_check_models::TitleCandidate;

use crate::error::SourceError;
use crate::justwatch::api;
use crate::traits::AvailabilityClient;

/// Availability client backed by the JustWatch GraphQL search.
pub struct JustWatchClient {
    client: Client,
    api_url: String,
    country: String,
    language: String,
}

impl JustWatchClient {
    pub fn new(country: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api::DEFAULT_API_URL.to_string(),
            country: country.into(),
            language: language.into(),
        }
    }

    /// Point the client at a different endpoint (local fixture server in
    /// tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl AvailabilityClient for JustWatchClient {
    async fn query(&self, key: &str) -> Result<Vec<TitleCandidate>, SourceError> {
        api::search_titles(&self.client, &self.api_url, key, &self.country, &self.language).await
    }
}
