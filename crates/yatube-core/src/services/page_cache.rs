//! Short-lived full-page cache for the home listing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::DomainError;
use crate::ports::{Cache, CacheError};

/// How long a rendered page stays fresh.
pub const PAGE_CACHE_TTL: Duration = Duration::from_secs(20);

const KEY_PREFIX: &str = "page:";

/// Rendered page bodies keyed by request path and query.
///
/// Writes never invalidate entries; a page is stale until it expires or
/// [`PageCache::clear`] runs.
#[derive(Clone)]
pub struct PageCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a request target such as `/?page=2`.
    pub fn key(path_and_query: &str) -> String {
        format!("{}{}", KEY_PREFIX, path_and_query)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    /// Store a body. A failing backend is logged and otherwise ignored.
    pub async fn store(&self, key: &str, body: &str) {
        if let Err(e) = self.cache.set(key, body, Some(self.ttl)).await {
            tracing::warn!(key, error = %e, "Failed to store cached page");
        }
    }

    /// Serve `key` from the cache or render and store it. The flag tells
    /// whether the body came from the cache.
    pub async fn get_or_insert_with<F, Fut>(
        &self,
        key: &str,
        render: F,
    ) -> Result<(String, bool), DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DomainError>>,
    {
        if let Some(body) = self.get(key).await {
            tracing::debug!(key, "Page cache hit");
            return Ok((body, true));
        }

        let body = render().await?;
        self.store(key, &body).await;
        Ok((body, false))
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.cache.clear().await?;
        tracing::info!("Page cache cleared");
        Ok(())
    }
}
