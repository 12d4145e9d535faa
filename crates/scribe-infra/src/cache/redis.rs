//! Redis cache implementation with connection pooling.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use scribe_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prepended to every key so several deployments can share one server.
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            namespace: "scribe:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            namespace: std::env::var("REDIS_NAMESPACE").unwrap_or_else(|_| "scribe:".to_string()),
        }
    }
}

/// Redis-backed cache implementation.
///
/// Uses connection manager for automatic reconnection and pooling.
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCache {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, namespace = %config.namespace, "Connected to Redis cache");

        Ok(Self {
            conn,
            namespace: config.namespace,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, CacheError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Delete every key matching a SCAN pattern, batch by batch.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Operation(e.to_string()))?;

            if !keys.is_empty() {
                total_deleted += conn
                    .del::<_, u64>(&keys)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }

            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        tracing::debug!(pattern = %pattern, deleted = total_deleted, "Redis keys invalidated");
        Ok(total_deleted)
    }
}

/// Escape glob metacharacters so a literal prefix can sit inside a MATCH pattern.
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        match ttl {
            Some(duration) => {
                conn.pset_ex::<_, _, ()>(key, value, duration.as_millis().max(1) as u64)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = format!("{}*", escape_glob(&self.key(prefix)));
        self.delete_matching(&pattern).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let pattern = format!("{}*", escape_glob(&self.namespace));
        self.delete_matching(&pattern).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn get_test_cache() -> Option<RedisCache> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            namespace: format!("scribe-test-{}:", uuid::Uuid::new_v4()),
        };

        RedisCache::new(config).await.ok()
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("page:group:cats:"), "page:group:cats:");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }

    #[tokio::test]
    async fn test_redis_cache_set_get() {
        let cache = match get_test_cache().await {
            Some(c) => c,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        let key = "test_key";
        let value = "test_value";

        cache.set(key, value, None).await.unwrap();
        assert_eq!(cache.get(key).await, Some(value.to_string()));

        cache.delete(key).await.unwrap();
        assert_eq!(cache.get(key).await, None);
    }

    #[tokio::test]
    async fn test_redis_cache_ttl() {
        let cache = match get_test_cache().await {
            Some(c) => c,
            None => return,
        };

        let key = "test_ttl_key";
        let value = "test_ttl_value";

        cache
            .set(key, value, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(cache.get(key).await, Some(value.to_string()));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get(key).await, None);
    }

    #[tokio::test]
    async fn test_redis_delete_prefix_and_clear() {
        let cache = match get_test_cache().await {
            Some(c) => c,
            None => return,
        };

        cache.set("page:index:1", "a", None).await.unwrap();
        cache.set("page:group:cats:1", "b", None).await.unwrap();

        assert_eq!(cache.delete_prefix("page:index:").await.unwrap(), 1);
        assert_eq!(cache.get("page:group:cats:1").await, Some("b".to_string()));

        cache.clear().await.unwrap();
        assert_eq!(cache.get("page:group:cats:1").await, None);
    }
}
