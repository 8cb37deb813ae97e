//! Shared test utilities for creator search.
//!
//! Scriptable embedding providers and cache stores, plus corpus fixtures.

pub mod fixtures;
pub mod logging;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::CacheStore;
use crate::error::{Result, SearchError};
use crate::search::embeddings::{EmbeddingProvider, HashEmbedder};
use crate::search::scoring::tokenize;

/// Hash embeddings with a call counter.
pub struct CountingProvider {
    inner: HashEmbedder,
    calls: AtomicUsize,
    latency: Duration,
}

impl CountingProvider {
    #[must_use]
    pub const fn new(dims: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dims),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long in every `embed` call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.inner.embed(text))
    }

    fn dims(&self) -> usize {
        self.inner.dims()
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Provider that always fails with a transient error.
pub struct FailingProvider {
    dims: usize,
    calls: AtomicUsize,
}

impl FailingProvider {
    #[must_use]
    pub const fn new(dims: usize) -> Self {
        Self {
            dims,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SearchError::EmbeddingTransient("provider offline".to_string()))
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Fails transiently for the first `failures` calls, then embeds.
pub struct FlakyProvider {
    inner: CountingProvider,
    failures: usize,
}

impl FlakyProvider {
    #[must_use]
    pub const fn new(dims: usize, failures: usize) -> Self {
        Self {
            inner: CountingProvider::new(dims),
            failures,
        }
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.inner.calls() < self.failures {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err(SearchError::EmbeddingTransient("try again".to_string()));
        }
        self.inner.embed(text).await
    }

    fn dims(&self) -> usize {
        self.inner.dims()
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// One dimension per topic word plus a constant bias dimension, so every
/// text has a non-zero vector and texts sharing topic words point the same
/// way. Counts calls.
pub struct TopicProvider {
    topics: Vec<String>,
    calls: AtomicUsize,
}

impl TopicProvider {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let tokens: BTreeSet<String> = tokenize(text);
        let mut vector: Vec<f32> = self
            .topics
            .iter()
            .map(|topic| if tokens.contains(topic) { 1.0 } else { 0.0 })
            .collect();
        vector.push(0.1);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for TopicProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector(text))
    }

    fn dims(&self) -> usize {
        self.topics.len() + 1
    }

    fn name(&self) -> &str {
        "topic"
    }
}

/// Cache store whose every operation fails.
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(SearchError::Cache("store offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<()> {
        Err(SearchError::Cache("store offline".to_string()))
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(SearchError::Cache("store offline".to_string()))
    }
}
