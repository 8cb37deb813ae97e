//! Embedding provider adapter.
//!
//! Wraps an [`EmbeddingProvider`] with the embedding cache, retry with
//! backoff and a dimension check. Query embeddings return
//! `EmbeddingUnavailable` once retries are exhausted; creator embeddings
//! degrade to an uncached zero vector.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cache::EmbeddingCache;
use crate::config::EmbeddingConfig;
use crate::core::creator::Creator;
use crate::core::recovery::{RetryConfig, RetryFailure, with_retry_if};
use crate::error::{Result, SearchError};
use crate::search::embeddings::EmbeddingProvider;

/// Cached, retrying front end to an embedding provider.
#[derive(Clone)]
pub struct EmbeddingAdapter {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<EmbeddingCache>,
    retry: RetryConfig,
    dims: usize,
    batch_size: usize,
    batch_pause: Duration,
}

impl EmbeddingAdapter {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Option<EmbeddingCache>,
        config: &EmbeddingConfig,
    ) -> Self {
        let retry = RetryConfig {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            ..RetryConfig::default()
        };
        Self {
            provider,
            cache,
            retry,
            dims: config.dims,
            batch_size: config.batch_size.max(1),
            batch_pause: Duration::from_millis(config.batch_pause_ms),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Vector length every returned embedding has.
    #[must_use]
    pub const fn dims(&self) -> usize {
        self.dims
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Embed a search query. Exhausted retries or a rejected request surface
    /// as [`SearchError::EmbeddingUnavailable`].
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.cached(text).await {
            return Ok(vector);
        }
        self.fetch(text)
            .await
            .map_err(|failure| SearchError::EmbeddingUnavailable {
                attempts: failure.attempts,
                reason: failure.error.to_string(),
            })
    }

    /// Embed arbitrary text, returning a zero vector when the provider
    /// cannot produce one. Zero vectors are not cached.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self.cached(text).await {
            return vector;
        }
        self.fetch_or_zero(text).await
    }

    /// Embeddings for `creators`, in input order, as `(id, vector)` pairs.
    ///
    /// Stored embeddings of the right length and cache hits are used as-is.
    /// The rest are generated `batch_size` at a time, concurrently within a
    /// batch, pausing between batches.
    pub async fn embed_creators(&self, creators: &[Creator]) -> Vec<(String, Vec<f32>)> {
        let mut vectors: Vec<Option<Vec<f32>>> = Vec::with_capacity(creators.len());
        let mut pending: Vec<(usize, String)> = Vec::new();

        for (index, creator) in creators.iter().enumerate() {
            if let Some(stored) = creator.embedding.as_ref() {
                if stored.len() == self.dims {
                    vectors.push(Some(stored.clone()));
                    continue;
                }
                debug!(
                    creator = %creator.id,
                    stored = stored.len(),
                    expected = self.dims,
                    "ignoring stored embedding with wrong dimension"
                );
            }

            let text = creator.canonical_text();
            match self.cached(&text).await {
                Some(vector) => vectors.push(Some(vector)),
                None => {
                    vectors.push(None);
                    pending.push((index, text));
                }
            }
        }

        if !pending.is_empty() {
            debug!(
                known = creators.len() - pending.len(),
                generating = pending.len(),
                batch_size = self.batch_size,
                "embedding creators"
            );
        }

        let mut batches = pending.chunks(self.batch_size).peekable();
        while let Some(batch) = batches.next() {
            let generated = join_all(batch.iter().map(|(_, text)| self.fetch_or_zero(text))).await;
            for ((index, _), vector) in batch.iter().zip(generated) {
                vectors[*index] = Some(vector);
            }
            if batches.peek().is_some() && !self.batch_pause.is_zero() {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        creators
            .iter()
            .zip(vectors)
            .map(|(creator, vector)| {
                (
                    creator.id.clone(),
                    vector.unwrap_or_else(|| vec![0.0; self.dims]),
                )
            })
            .collect()
    }

    async fn cached(&self, text: &str) -> Option<Vec<f32>> {
        let vector = self.cache.as_ref()?.get(text).await?;
        if vector.len() == self.dims {
            Some(vector)
        } else {
            debug!(cached = vector.len(), expected = self.dims, "cached embedding has wrong dimension");
            None
        }
    }

    async fn fetch_or_zero(&self, text: &str) -> Vec<f32> {
        match self.fetch(text).await {
            Ok(vector) => vector,
            Err(failure) => {
                warn!(
                    provider = self.provider.name(),
                    attempts = failure.attempts,
                    error = %failure.error,
                    "embedding failed, using zero vector"
                );
                vec![0.0; self.dims]
            }
        }
    }

    /// Call the provider with retries, check the dimension, write through
    /// to the cache.
    async fn fetch(&self, text: &str) -> std::result::Result<Vec<f32>, RetryFailure<SearchError>> {
        let provider = &self.provider;
        let vector = with_retry_if(
            &self.retry,
            move || provider.embed(text),
            |err: &SearchError| err.is_transient(),
        )
        .await?;

        if vector.len() != self.dims {
            return Err(RetryFailure {
                error: SearchError::EmbeddingDimension {
                    expected: self.dims,
                    actual: vector.len(),
                },
                attempts: 1,
            });
        }

        if let Some(cache) = &self.cache {
            if vector.iter().any(|v| *v != 0.0) {
                cache.put(text, &vector).await;
            }
        }
        Ok(vector)
    }
}
