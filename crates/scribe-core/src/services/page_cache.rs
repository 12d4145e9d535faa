//! Rendered-page cache for the public feeds.
//!
//! Keys are built from the route scope and the page number the request
//! resolves to, so out-of-range requests share the last page's entry:
//! `page:index:<n>` and `page:group:<slug>:<n>`. Writes that change a feed
//! drop its whole scope; the TTL bounds staleness for everything else.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::Cache;

/// Default lifetime of a cached page.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(8);

/// A cached listing route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScope<'a> {
    Index,
    Group(&'a str),
}

impl PageScope<'_> {
    fn prefix(&self) -> String {
        match self {
            PageScope::Index => "page:index:".to_string(),
            PageScope::Group(slug) => format!("page:group:{slug}:"),
        }
    }
}

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

    pub fn key(scope: PageScope<'_>, page: u64) -> String {
        format!("{}{}", scope.prefix(), page)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.cache.get(key).await;
        tracing::debug!(key = %key, hit = hit.is_some(), "Page cache lookup");
        hit
    }

    /// Store a rendered page. Failures are logged, never surfaced.
    pub async fn put(&self, key: &str, body: &str) {
        if let Err(e) = self.cache.set(key, body, Some(self.ttl)).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache page");
        }
    }

    /// Drop every cached page of a scope.
    pub async fn invalidate(&self, scope: PageScope<'_>) {
        match self.cache.delete_prefix(&scope.prefix()).await {
            Ok(removed) => tracing::debug!(scope = ?scope, removed, "Page cache invalidated"),
            Err(e) => tracing::warn!(scope = ?scope, error = %e, "Page cache invalidation failed"),
        }
    }

    /// Drop every cached page.
    pub async fn clear(&self) {
        if let Err(e) = self.cache.clear().await {
            tracing::warn!(error = %e, "Page cache clear failed");
        }
    }
}
