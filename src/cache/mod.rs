//! Redirect cache subsystem.
//!
//! # Data Flow
//! ```text
//! request → key.rs (normalized URL + negotiated language)
//!     → RedirectCache::lookup → store.rs get
//!         hit:  cloned response, currency cookie re-stamped per client
//!         miss: pipeline runs, RedirectCache::store spawns store.rs put
//! ```
//!
//! # Design Decisions
//! - Cache-aside: the store is never the source of truth
//! - Store errors are misses; failed writes are logged and swallowed
//! - Writes are spawned so they never delay the response
//! - Entries never contain a currency Set-Cookie

pub mod entry;
pub mod key;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

pub use entry::{is_shareable, CachedResponse};
pub use key::cache_key;
pub use store::{CacheError, CacheStore, MemoryStore};

use crate::config::CacheConfig;
use crate::observability::metrics;

/// Cache-aside wrapper around a shared store.
#[derive(Clone)]
pub struct RedirectCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    enabled: bool,
    max_body_bytes: usize,
}

impl RedirectCache {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: Duration::from_secs(config.ttl_secs),
            enabled: config.enabled,
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Largest passthrough body worth buffering for the cache.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Look up a stored response. Any store failure is a miss.
    pub async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        if !self.enabled {
            return None;
        }

        match self.store.get(key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "Cache hit");
                metrics::record_cache_event("hit");
                Some(hit)
            }
            Ok(None) => {
                metrics::record_cache_event("miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                metrics::record_cache_event("error");
                None
            }
        }
    }

    /// Store a response in the background.
    pub fn store(&self, key: String, response: CachedResponse) {
        if !self.enabled {
            return;
        }
        if response.sets_cookies() || !is_shareable(&response.headers) {
            tracing::debug!(key = %key, "Not caching a client-specific response");
            return;
        }

        let store = Arc::clone(&self.store);
        let ttl = self.ttl;
        tokio::spawn(async move {
            if let Err(e) = store.put(key.clone(), response, ttl).await {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                metrics::record_cache_event("write_error");
            }
        });
    }
}

impl std::fmt::Debug for RedirectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use axum::http::header::SET_COOKIE;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};

    struct Broken;

    #[async_trait]
    impl CacheStore for Broken {
        async fn get(&self, _key: &str) -> Result<Option<CachedResponse>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn put(&self, _: String, _: CachedResponse, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    fn response(headers: HeaderMap) -> CachedResponse {
        CachedResponse::new(StatusCode::FOUND, headers, Bytes::new())
    }

    async fn settle(store: &MemoryStore) {
        for _ in 0..200 {
            if !store.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn stores_in_background_then_hits() {
        let store = MemoryStore::new(10);
        let cache = RedirectCache::new(Arc::new(store.clone()), &CacheConfig::default());

        assert!(cache.lookup("k").await.is_none());
        cache.store("k".into(), response(HeaderMap::new()));
        settle(&store).await;
        assert_eq!(cache.lookup("k").await, Some(response(HeaderMap::new())));
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let store = MemoryStore::new(10);
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = RedirectCache::new(Arc::new(store.clone()), &config);

        cache.store("k".into(), response(HeaderMap::new()));
        tokio::task::yield_now().await;
        assert!(store.is_empty());
        assert!(cache.lookup("k").await.is_none());
    }

    #[tokio::test]
    async fn cookie_bearing_responses_are_refused() {
        let store = MemoryStore::new(10);
        let cache = RedirectCache::new(Arc::new(store.clone()), &CacheConfig::default());

        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_static("woocs_curr=EUR"));
        cache.store("k".into(), response(headers));
        tokio::task::yield_now().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_errors_are_misses() {
        let cache = RedirectCache::new(Arc::new(Broken), &CacheConfig::default());
        assert!(cache.lookup("k").await.is_none());
        cache.store("k".into(), response(HeaderMap::new()));
    }
}
