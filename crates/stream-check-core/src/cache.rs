use std::collections::HashMap;
use stream_check_models::AvailabilityOffer;
use tokio::sync::RwLock;

/// What a completed lookup left behind: the selected candidate's offers
/// before service filtering, so a service-selection change between runs in
/// the same session still hits the cache. Failed lookups are never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedLookup {
    pub offers: Vec<AvailabilityOffer>,
    pub poster_url: Option<String>,
}

/// Session-scoped availability cache keyed by `(normalized key, year)`.
///
/// Tolerates concurrent reads and writes; a miss-then-fill race is
/// last-writer-wins, and identical keys resolve to the same value regardless
/// of write order. No eviction beyond process teardown.
#[derive(Default)]
pub struct OfferCache {
    inner: RwLock<HashMap<(String, Option<u32>), CachedLookup>>,
}

impl OfferCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str, year: Option<u32>) -> Option<CachedLookup> {
        self.inner
            .read()
            .await
            .get(&(key.to_string(), year))
            .cloned()
    }

    pub async fn put(&self, key: String, year: Option<u32>, lookup: CachedLookup) {
        self.inner.write().await.insert((key, year), lookup);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}
