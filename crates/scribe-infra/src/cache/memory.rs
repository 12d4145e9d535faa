//! In-memory cache implementation - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory cache using a simple HashMap with async RwLock.
///
/// This is the fallback implementation when Redis is not available.
/// Note: Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::expired_at(entry, Instant::now())
    }

    fn expired_at(entry: &CacheEntry, now: Instant) -> bool {
        entry.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Number of stored entries, expired ones included until the next write.
    pub async fn entry_count(&self) -> usize {
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

        if Self::is_expired(entry) {
            drop(store);
            let mut store = self.store.write().await;
            store.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        // Expired entries are otherwise only dropped when read again.
        let now = Instant::now();
        store.retain(|_, entry| !Self::expired_at(entry, now));

        let expires_at = ttl.map(|d| now + d);

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

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|key, _| !key.starts_with(prefix));
        Ok((before - store.len()) as u64)
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
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("page:index:1", "cached", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(cache.get("page:index:1").await, Some("cached".to_string()));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("page:index:1").await, None);
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries() {
        let cache = InMemoryCache::new();
        for page in 1..=5 {
            cache
                .set(&format!("page:index:{page}"), "old", Some(Duration::from_millis(20)))
                .await
                .unwrap();
        }
        cache.set("page:group:cats:1", "kept", None).await.unwrap();
        assert_eq!(cache.entry_count().await, 6);

        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.set("page:index:1", "new", None).await.unwrap();

        assert_eq!(cache.entry_count().await, 2);
        assert_eq!(cache.get("page:index:1").await, Some("new".to_string()));
        assert_eq!(cache.get("page:group:cats:1").await, Some("kept".to_string()));
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_matching_keys() {
        let cache = InMemoryCache::new();
        cache.set("page:index:1", "a", None).await.unwrap();
        cache.set("page:index:2", "b", None).await.unwrap();
        cache.set("page:group:cats:1", "c", None).await.unwrap();

        let removed = cache.delete_prefix("page:index:").await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(cache.get("page:index:1").await, None);
        assert_eq!(cache.get("page:group:cats:1").await, Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", None).await.unwrap();
        cache.set("b", "2", None).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, None);
    }
}
