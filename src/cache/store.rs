//! Cache store contract and the in-process implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::cache::entry::CachedResponse;
use crate::observability::metrics;

/// Longest lifetime an entry can have, whatever TTL is requested.
const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Errors a cache store may report. Callers treat all of them as misses.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("cache store is full ({0} entries)")]
    Full(usize),
}

/// Key-value store for cached responses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>, CacheError>;

    async fn put(
        &self,
        key: String,
        response: CachedResponse,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A thread-safe in-memory store with per-entry expiry.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryStore {
    /// Create a new empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every expired entry.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.is_fresh(now));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.inner.len(), "Swept expired cache entries");
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        let now = Instant::now();
        match self.inner.get(key) {
            Some(entry) if entry.is_fresh(now) => return Ok(Some(entry.response.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        self.inner.remove_if(key, |_, entry| !entry.is_fresh(now));
        metrics::record_cache_size(self.inner.len());
        Ok(None)
    }

    async fn put(
        &self,
        key: String,
        response: CachedResponse,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if self.inner.len() >= self.max_entries && !self.inner.contains_key(&key) {
            self.sweep();
            if self.inner.len() >= self.max_entries {
                return Err(CacheError::Full(self.max_entries));
            }
        }

        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        self.inner.insert(key, Entry { response, expires_at });
        metrics::record_cache_size(self.inner.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};

    fn response(body: &'static str) -> CachedResponse {
        CachedResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let store = MemoryStore::new(10);

        assert!(store.get("k").await.unwrap().is_none());

        store
            .put("k".into(), response("one"), Duration::from_secs(60))
            .await
            .unwrap();
        let hit = store.get("k").await.unwrap().unwrap();
        assert_eq!(hit.body, Bytes::from_static(b"one"));

        store
            .put("k".into(), response("two"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap().body, Bytes::from_static(b"two"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let store = MemoryStore::new(10);
        store
            .put("k".into(), response("old"), Duration::ZERO)
            .await
            .unwrap();

        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_full_store_rejects_new_keys() {
        let store = MemoryStore::new(1);
        store
            .put("a".into(), response("a"), Duration::from_secs(60))
            .await
            .unwrap();

        let err = store
            .put("b".into(), response("b"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Full(1)));

        // Existing keys can still be refreshed.
        store
            .put("a".into(), response("a2"), Duration::from_secs(60))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let store = MemoryStore::new(10);
        store
            .put("k".into(), response("forever"), Duration::MAX)
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_makes_room() {
        let store = MemoryStore::new(1);
        store
            .put("a".into(), response("a"), Duration::ZERO)
            .await
            .unwrap();
        store
            .put("b".into(), response("b"), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.get("b").await.unwrap().is_some());
        assert_eq!(store.len(), 1);
    }
}
