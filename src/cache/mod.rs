//! Key/value caching for embeddings and search results.
//!
//! Both caches sit on a [`CacheStore`] with per-entry TTLs. Embeddings are
//! keyed by a hash of their canonical text, so identical profiles share one
//! entry regardless of creator id. Store failures are logged and treated as
//! misses; a search never fails because the cache did.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::search::filters::SearchFilters;
use crate::search::types::SearchResponse;

/// Generic JSON key/value store with per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-process LRU store. Expired entries are dropped lazily on access.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn live_value(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().put(key.to_string(), entry);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_value(key).is_some())
    }
}

/// Hex-encoded SHA-256 of `text`.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Embedding vectors keyed by the hash of the text they were computed from.
#[derive(Clone)]
pub struct EmbeddingCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl EmbeddingCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn key(text: &str) -> String {
        format!("embedding:{}", content_hash(text))
    }

    /// Cached vector for `text`, if any.
    pub async fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = Self::key(text);
        match self.store.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(vector) => {
                    debug!(key = %key, "embedding cache hit");
                    Some(vector)
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "discarding malformed cached embedding");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key = %key, error = %err, "embedding cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, text: &str, vector: &[f32]) {
        let key = Self::key(text);
        let value = match serde_json::to_value(vector) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "could not serialize embedding");
                return;
            }
        };
        if let Err(err) = self.store.set(&key, value, self.ttl).await {
            warn!(key = %key, error = %err, "embedding cache write failed");
        }
    }
}

#[derive(Serialize)]
struct ResultKeyParts<'a> {
    query: String,
    limit: usize,
    threshold: String,
    filters: &'a SearchFilters,
}

/// Final search responses keyed by query, limit, filters and threshold.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Cache key for a request. The query is lower-cased and its whitespace
    /// collapsed; category filters are compared as a sorted, lower-cased set.
    pub fn key(query: &str, limit: usize, filters: &SearchFilters, threshold: f32) -> Result<String> {
        let filters = filters.canonical();
        let parts = ResultKeyParts {
            query: query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase(),
            limit,
            threshold: format!("{threshold:.4}"),
            filters: &filters,
        };
        let encoded = serde_json::to_string(&parts)
            .map_err(|err| SearchError::Cache(format!("encode result key: {err}")))?;
        Ok(format!("search:{}", content_hash(&encoded)))
    }

    pub async fn get(&self, key: &str) -> Option<SearchResponse> {
        match self.store.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(response) => Some(response),
                Err(err) => {
                    warn!(key, error = %err, "discarding malformed cached response");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "result cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, key: &str, response: &SearchResponse) {
        let value = match serde_json::to_value(response) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "could not serialize search response");
                return;
            }
        };
        if let Err(err) = self.store.set(key, value, self.ttl).await {
            warn!(key, error = %err, "result cache write failed");
        }
    }
}
