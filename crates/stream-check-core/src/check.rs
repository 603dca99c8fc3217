use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use stream_check_config::{Config, RunLimits};
use stream_check_models::{
    MatchedResult, NormalizedTitle, RunOutcome, RunReport, TitleCandidate, WatchlistEntry,
};
use stream_check_sources::{parse_watchlist_page, AvailabilityClient, SourceError, WatchlistFetcher};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CachedLookup, OfferCache};
use crate::select::{filter_offers, select_candidate};

#[derive(Debug, Error)]
pub enum RunError {
    /// Missing/invalid username or empty service selection. The only failure
    /// that aborts a run outright; page-level failures end it early with a
    /// partial outcome instead.
    #[error("invalid run configuration: {0}")]
    Configuration(String),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pagination hard stop, guards against a source that never signals a
    /// last page.
    pub max_pages: u32,
    /// Maximum in-flight availability queries.
    pub concurrency: usize,
    /// Delay before the single retry of a transport-failed query.
    pub retry_delay: Duration,
    /// Overall run deadline; expired lookups are abandoned, not awaited.
    pub deadline: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&RunLimits::default())
    }
}

impl From<&RunLimits> for RunOptions {
    fn from(limits: &RunLimits) -> Self {
        Self {
            max_pages: limits.max_pages,
            concurrency: limits.concurrency.max(1),
            retry_delay: Duration::from_millis(limits.retry_delay_ms),
            deadline: (limits.deadline_secs > 0)
                .then(|| Duration::from_secs(limits.deadline_secs)),
        }
    }
}

/// Drives the whole pipeline: sequential pagination through the watchlist,
/// slug dedup, concurrent availability lookups, candidate selection and
/// service filtering, emitting exactly one [`MatchedResult`] per distinct
/// entry in the watchlist's original order.
pub struct WatchlistChecker {
    fetcher: Arc<dyn WatchlistFetcher>,
    availability: Arc<dyn AvailabilityClient>,
    cache: Arc<OfferCache>,
    options: RunOptions,
}

impl WatchlistChecker {
    pub fn new(fetcher: Arc<dyn WatchlistFetcher>, availability: Arc<dyn AvailabilityClient>) -> Self {
        Self {
            fetcher,
            availability,
            cache: Arc::new(OfferCache::new()),
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Share a cache across checkers or keep one alive over repeated runs
    /// within an interactive session.
    pub fn with_cache(mut self, cache: Arc<OfferCache>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn run(&self, config: &Config) -> Result<RunOutcome, RunError> {
        config
            .validate()
            .map_err(|e| RunError::Configuration(e.to_string()))?;
        let services = config.selected_services();

        let deadline = self.options.deadline.map(|d| Instant::now() + d);

        let (entries, pages_fetched, failure) = self.collect_entries(&config.username).await;
        let partial = failure.is_some();

        let mut seen = HashSet::new();
        let entries: Vec<WatchlistEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.slug.clone()))
            .collect();
        let entries_total = entries.len();

        info!(
            username = %config.username,
            pages_fetched,
            entries_total,
            partial,
            "watchlist collected, checking availability"
        );

        // Bounded-concurrency dispatch; `buffered` keeps the emitted order
        // equal to the input order no matter which lookups finish first.
        let results: Vec<MatchedResult> = stream::iter(entries)
            .map(|entry| self.match_entry(entry, &services, deadline))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let queries_failed = results.iter().filter(|r| r.lookup_failed).count();

        Ok(RunOutcome {
            results,
            report: RunReport {
                pages_fetched,
                entries_total,
                queries_failed,
                partial,
                failure,
            },
        })
    }

    /// Sequential pagination: page n+1 is never requested before page n has
    /// answered. Page fetches are not retried; the first page-level failure
    /// stops pagination and is reported, keeping everything gathered so far.
    async fn collect_entries(
        &self,
        username: &str,
    ) -> (Vec<WatchlistEntry>, u32, Option<String>) {
        let mut entries = Vec::new();
        let mut pages_fetched = 0u32;
        let mut page = 1u32;

        loop {
            let html = match self.fetcher.fetch_page(username, page).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(page, error = %e, "watchlist page fetch failed, stopping pagination");
                    return (entries, pages_fetched, Some(format!("page {page}: {e}")));
                }
            };
            pages_fetched += 1;

            match parse_watchlist_page(&html, page) {
                Ok(parsed) => {
                    let last = parsed.is_last_page;
                    entries.extend(parsed.entries);
                    if last {
                        debug!(page, "last watchlist page reached");
                        break;
                    }
                }
                Err(e) => {
                    warn!(page, error = %e, "watchlist page parse failed, stopping pagination");
                    return (entries, pages_fetched, Some(format!("page {page}: {e}")));
                }
            }

            if page >= self.options.max_pages {
                warn!(
                    max_pages = self.options.max_pages,
                    "page limit reached before an empty page"
                );
                break;
            }
            page += 1;
        }

        (entries, pages_fetched, None)
    }

    async fn match_entry(
        &self,
        entry: WatchlistEntry,
        services: &HashSet<String>,
        deadline: Option<Instant>,
    ) -> MatchedResult {
        let normalized = NormalizedTitle::from_display(&entry.display_title);

        if let Some(hit) = self.cache.get(&normalized.key, normalized.year).await {
            debug!(key = %normalized.key, "availability cache hit");
            return build_result(entry, &hit, services, false);
        }

        match self.query_with_retry(&normalized.key, deadline).await {
            Ok(candidates) => {
                let chosen = select_candidate(&candidates, normalized.year);
                let lookup = CachedLookup {
                    offers: chosen.map(|c| c.offers.clone()).unwrap_or_default(),
                    poster_url: chosen.and_then(|c| c.poster_url.clone()),
                };
                self.cache
                    .put(normalized.key.clone(), normalized.year, lookup.clone())
                    .await;
                build_result(entry, &lookup, services, false)
            }
            Err(e) => {
                warn!(title = %entry.display_title, error = %e, "availability lookup failed");
                build_result(entry, &CachedLookup::default(), services, true)
            }
        }
    }

    /// One retry with a short fixed delay, on transport failures only. A
    /// structurally malformed response and an expired deadline are final.
    async fn query_with_retry(
        &self,
        key: &str,
        deadline: Option<Instant>,
    ) -> Result<Vec<TitleCandidate>, SourceError> {
        match self.query_until_deadline(key, deadline).await {
            Err(e) if e.is_transport() && !deadline_expired(deadline) => {
                debug!(key, error = %e, "retrying availability query");
                tokio::time::sleep(self.options.retry_delay).await;
                self.query_until_deadline(key, deadline).await
            }
            other => other,
        }
    }

    async fn query_until_deadline(
        &self,
        key: &str,
        deadline: Option<Instant>,
    ) -> Result<Vec<TitleCandidate>, SourceError> {
        match deadline {
            Some(at) => match tokio::time::timeout_at(at, self.availability.query(key)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::transport(
                    None,
                    "run deadline expired, lookup abandoned",
                )),
            },
            None => self.availability.query(key).await,
        }
    }
}

fn deadline_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|at| Instant::now() >= at)
}

fn build_result(
    entry: WatchlistEntry,
    lookup: &CachedLookup,
    services: &HashSet<String>,
    lookup_failed: bool,
) -> MatchedResult {
    let offers = filter_offers(&lookup.offers, services);
    MatchedResult {
        poster_url: entry.poster_url.clone().or_else(|| lookup.poster_url.clone()),
        entry,
        offers,
        lookup_failed,
    }
}
