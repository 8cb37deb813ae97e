//! Embedding backends.
//!
//! Two implementations of [`EmbeddingProvider`]:
//! - [`HashEmbedder`]: FNV-1a feature hashing, deterministic and offline
//! - [`ApiEmbedder`]: HTTP client for a Gemini-style `embedContent` endpoint

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::error::{Result, SearchError};

/// External capability that turns text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this provider returns.
    fn dims(&self) -> usize;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Build a provider from embedding config, reading the API key from the
/// process environment.
pub fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    build_provider_with_env(config, |key| std::env::var(key).ok())
}

/// Like [`build_provider`] but resolves environment variables through `lookup`.
pub fn build_provider_with_env(
    config: &EmbeddingConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    if config.dims == 0 {
        return Err(SearchError::Config(
            "embedding.dims must be greater than 0".to_string(),
        ));
    }

    let backend = config.backend.trim().to_lowercase();
    match backend.as_str() {
        "" | "hash" => Ok(Arc::new(HashEmbedder::new(config.dims))),
        "api" | "gemini" => {
            let api_key = lookup(&config.api_key_env)
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| SearchError::MissingConfig(config.api_key_env.clone()))?;
            Ok(Arc::new(ApiEmbedder::new(config, api_key)?))
        }
        other => Err(SearchError::Config(format!(
            "unknown embedding backend: {other}"
        ))),
    }
}

// =============================================================================
// Hash embedder
// =============================================================================

/// Hash embedder using FNV-1a
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: 768 }
    }
}

impl HashEmbedder {
    /// Create embedder with specified dimension
    #[must_use]
    pub const fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Embed text into an L2-normalized vector. Text without any token of two
    /// or more characters embeds to the zero vector.
    #[must_use]
    pub fn embed(&self, text: &str) -> Vec<f32> {
        if self.dim == 0 {
            return Vec::new();
        }

        let tokens = tokenize(text);
        let mut embedding = vec![0.0; self.dim];

        if tokens.is_empty() {
            return embedding;
        }

        for token in &tokens {
            accumulate_embedding(&mut embedding, token, 1.0);
        }

        for window in tokens.windows(2) {
            let bigram = format!("{} {}", window[0], window[1]);
            accumulate_embedding(&mut embedding, &bigram, 0.5);
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::embed(self, text))
    }

    fn dims(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hash"
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|token| token.len() >= 2)
        .map(ToString::to_string)
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn accumulate_embedding(embedding: &mut [f32], token: &str, weight: f32) {
    let token_hash = fnv1a_hash(token.as_bytes());

    for i in 0..embedding.len() {
        let dim_hash = fnv1a_hash_with_salt(token_hash, i as u64);
        let sign = if dim_hash & 1 == 0 { weight } else { -weight };
        let dim = ((dim_hash >> 1) as usize) % embedding.len();
        embedding[dim] += sign;
    }
}

fn fnv1a_hash_with_salt(seed: u64, salt: u64) -> u64 {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    bytes[8..].copy_from_slice(&salt.to_le_bytes());
    fnv1a_hash(&bytes)
}

fn fnv1a_hash(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

// =============================================================================
// HTTP embedder
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: [EmbedPart<'a>; 1],
}

#[derive(Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbedValues,
}

#[derive(Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

/// Client for `POST {endpoint}/models/{model}:embedContent`.
///
/// Network errors, 429 and 5xx responses and undecodable bodies are
/// transient; any other non-success status is a rejection.
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
    dims: usize,
}

impl std::fmt::Debug for ApiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEmbedder")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

impl ApiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        if config.endpoint.starts_with("http://") {
            warn!("Embedding endpoint uses unencrypted HTTP. The API key will be sent in plain text.");
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SearchError::Config(format!("embedding http client: {err}")))?;

        let url = format!(
            "{}/models/{}:embedContent",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&config.model)
        );

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            api_key,
            dims: config.dims,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: EmbedContent {
                parts: [EmbedPart { text }],
            },
            task_type: "SEMANTIC_SIMILARITY",
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| SearchError::EmbeddingTransient(format!("embedding request failed: {err}")))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(SearchError::EmbeddingTransient(format!(
                "embedding HTTP {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(200).collect();
            return Err(SearchError::EmbeddingRejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbedResponse = response.json().await.map_err(|err| {
            SearchError::EmbeddingTransient(format!("embedding response parse: {err}"))
        })?;
        debug!(model = %self.model, dims = parsed.embedding.values.len(), "embedding received");
        Ok(parsed.embedding.values)
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "api"
    }
}
