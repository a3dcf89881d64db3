//! In-memory cache implementation - the default page cache backend and the
//! fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }
}

/// In-memory cache using a simple HashMap with async RwLock.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`InMemoryCache::purge_expired`]. Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }

    /// Drop `key` only if it is still expired once the write lock is held;
    /// a fresh value stored in between survives.
    async fn remove_if_expired(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        let expired = store
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()));
        if expired {
            store.remove(key);
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired(Instant::now()) {
            drop(store);
            self.remove_if_expired(key).await;
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        let expires_at = ttl.map(|d| Instant::now() + d);

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!cache.exists("short").await);
    }

    #[tokio::test]
    async fn test_lazy_expiry_spares_a_fresh_value() {
        let cache = InMemoryCache::new();
        cache
            .set("page:/", "old", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // A new render lands between the expired read and the removal.
        cache
            .set("page:/", "new", Some(Duration::from_secs(20)))
            .await
            .unwrap();
        assert!(!cache.remove_if_expired("page:/").await);
        assert_eq!(cache.get("page:/").await.as_deref(), Some("new"));

        cache
            .set("page:/home", "old", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.remove_if_expired("page:/home").await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache
            .set("long", "v", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", None).await.unwrap();
        cache.set("b", "2", None).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.len().await, 0);
    }
}
