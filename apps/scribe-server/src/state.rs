//! Application state - shared across all handlers.

use std::sync::Arc;

use scribe_core::BlogService;
use scribe_core::ports::{Cache, MediaStore, PasswordService, TokenService, UserRepository};
use scribe_core::services::{PageCache, Repositories};
use scribe_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService, LocalMediaStore,
};

#[cfg(feature = "postgres")]
use scribe_infra::{DatabaseConnections, postgres_repositories};
#[cfg(feature = "redis")]
use scribe_infra::{RedisCache, RedisConfig};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub session: SessionConfig,
}

impl AppState {
    /// Build the application state, falling back to in-memory backends for
    /// anything not configured or unreachable.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::repositories(config).await;
        let cache = Self::cache(config).await;
        let state = Self::from_parts(config, repos, cache);

        tracing::info!("Application state initialized");
        state
    }

    /// Wire state from already chosen storage and cache backends.
    pub fn from_parts(config: &AppConfig, repos: Repositories, cache: Arc<dyn Cache>) -> Self {
        let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(config.media_root.clone()));
        let pages = PageCache::new(cache, config.page_cache_ttl);

        Self {
            blog: BlogService::new(repos, media, pages, config.page_size),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            session: config.session.clone(),
        }
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.blog.repositories().users
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return InMemoryStore::new().repositories();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => postgres_repositories(&connections.main),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                InMemoryStore::new().repositories()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory store");
        InMemoryStore::new().repositories()
    }

    #[cfg(feature = "redis")]
    async fn cache(config: &AppConfig) -> Arc<dyn Cache> {
        let Some(url) = &config.redis_url else {
            tracing::info!("REDIS_URL not set. Using in-memory page cache.");
            return Arc::new(InMemoryCache::new());
        };

        let redis_config = RedisConfig {
            url: url.clone(),
            connect_timeout: config.redis_connect_timeout,
            ..RedisConfig::default()
        };
        match RedisCache::new(redis_config).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::error!(error = %e, "Redis unavailable. Using in-memory page cache.");
                Arc::new(InMemoryCache::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn cache(_config: &AppConfig) -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}
