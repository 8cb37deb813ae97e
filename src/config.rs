use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::search::index::SimilarityMetric;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CSEARCH_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration: defaults, then the global and project files (or
    /// an explicit file), then `CSEARCH_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, project_root, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`] but reads environment variables through `lookup`.
    pub fn load_with_env(
        explicit_path: Option<&Path>,
        project_root: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| lookup(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SearchError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("csearch/config.toml"))
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join("csearch.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SearchError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SearchError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let env = EnvReader { lookup };

        if let Some(value) = env.f32("CSEARCH_THRESHOLD")? {
            self.search.similarity_threshold = value;
        }
        if let Some(value) = env.usize("CSEARCH_DEFAULT_LIMIT")? {
            self.search.default_limit = value;
        }
        if let Some(value) = env.usize("CSEARCH_MAX_LIMIT")? {
            self.search.max_limit = value;
        }
        if let Some(value) = env.string("CSEARCH_METRIC") {
            self.search.metric = value.parse()?;
        }

        if let Some(value) = env.string("CSEARCH_EMBEDDING_BACKEND") {
            self.embedding.backend = value;
        }
        if let Some(value) = env.usize("CSEARCH_EMBEDDING_DIMS")? {
            self.embedding.dims = value;
        }
        if let Some(value) = env.string("CSEARCH_EMBEDDING_MODEL") {
            self.embedding.model = value;
        }
        if let Some(value) = env.string("CSEARCH_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = value;
        }
        if let Some(value) = env.u64("CSEARCH_EMBEDDING_TIMEOUT_SECS")? {
            self.embedding.timeout_secs = value;
        }
        if let Some(value) = env.u32("CSEARCH_EMBEDDING_MAX_ATTEMPTS")? {
            self.embedding.max_attempts = value;
        }
        if let Some(value) = env.u64("CSEARCH_EMBEDDING_RETRY_DELAY_MS")? {
            self.embedding.initial_delay_ms = value;
        }
        if let Some(value) = env.usize("CSEARCH_EMBEDDING_BATCH_SIZE")? {
            self.embedding.batch_size = value;
        }

        if env.bool("CSEARCH_CACHE_DISABLED").unwrap_or(false) {
            self.cache.enabled = false;
        }
        if let Some(value) = env.u64("CSEARCH_CACHE_EMBEDDING_TTL")? {
            self.cache.embedding_ttl_secs = value;
        }
        if let Some(value) = env.u64("CSEARCH_CACHE_RESULT_TTL")? {
            self.cache.result_ttl_secs = value;
        }

        Ok(())
    }

    /// Reject values the search path cannot work with.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.search.similarity_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(SearchError::Config(format!(
                "search.similarity_threshold must be within [-1, 1], got {threshold}"
            )));
        }
        if self.search.max_limit == 0 {
            return Err(SearchError::Config("search.max_limit must be at least 1".to_string()));
        }
        if self.search.max_query_length == 0 {
            return Err(SearchError::Config(
                "search.max_query_length must be at least 1".to_string(),
            ));
        }
        if self.embedding.dims == 0 {
            return Err(SearchError::Config("embedding.dims must be at least 1".to_string()));
        }
        if self.embedding.max_attempts == 0 {
            return Err(SearchError::Config(
                "embedding.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(SearchError::Config(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity for a candidate to survive the index scan.
    #[serde(default)]
    pub similarity_threshold: f32,
    #[serde(default)]
    pub default_limit: usize,
    #[serde(default)]
    pub max_limit: usize,
    #[serde(default)]
    pub max_query_length: usize,
    #[serde(default)]
    pub metric: SimilarityMetric,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.2,
            default_limit: 10,
            max_limit: 50,
            max_query_length: 500,
            metric: SimilarityMetric::Cosine,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.similarity_threshold {
            self.similarity_threshold = value;
        }
        if let Some(value) = patch.default_limit {
            self.default_limit = value;
        }
        if let Some(value) = patch.max_limit {
            self.max_limit = value;
        }
        if let Some(value) = patch.max_query_length {
            self.max_query_length = value;
        }
        if let Some(value) = patch.metric {
            self.metric = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `hash` (offline) or `api` (HTTP embedding service).
    #[serde(default)]
    pub backend: String,
    #[serde(default)]
    pub dims: usize,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: String,
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_attempts: u32,
    #[serde(default)]
    pub initial_delay_ms: u64,
    #[serde(default)]
    pub batch_size: usize,
    #[serde(default)]
    pub batch_pause_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "hash".to_string(),
            dims: 768,
            model: "text-embedding-004".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            initial_delay_ms: 1000,
            batch_size: 5,
            batch_pause_ms: 100,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.backend {
            self.backend = value;
        }
        if let Some(value) = patch.dims {
            self.dims = value;
        }
        if let Some(value) = patch.model {
            self.model = value;
        }
        if let Some(value) = patch.endpoint {
            self.endpoint = value;
        }
        if let Some(value) = patch.api_key_env {
            self.api_key_env = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.max_attempts {
            self.max_attempts = value;
        }
        if let Some(value) = patch.initial_delay_ms {
            self.initial_delay_ms = value;
        }
        if let Some(value) = patch.batch_size {
            self.batch_size = value;
        }
        if let Some(value) = patch.batch_pause_ms {
            self.batch_pause_ms = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub embedding_ttl_secs: u64,
    #[serde(default)]
    pub result_ttl_secs: u64,
    #[serde(default)]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            embedding_ttl_secs: 86_400,
            result_ttl_secs: 3_600,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.embedding_ttl_secs {
            self.embedding_ttl_secs = value;
        }
        if let Some(value) = patch.result_ttl_secs {
            self.result_ttl_secs = value;
        }
        if let Some(value) = patch.max_entries {
            self.max_entries = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub search: Option<SearchPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub cache: Option<CachePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub similarity_threshold: Option<f32>,
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub max_query_length: Option<usize>,
    pub metric: Option<SimilarityMetric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EmbeddingPatch {
    pub backend: Option<String>,
    pub dims: Option<usize>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub batch_size: Option<usize>,
    pub batch_pause_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CachePatch {
    pub enabled: Option<bool>,
    pub embedding_ttl_secs: Option<u64>,
    pub result_ttl_secs: Option<u64>,
    pub max_entries: Option<usize>,
}

struct EnvReader<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<'_, F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.string(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                SearchError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn u32(&self, key: &str) -> Result<Option<u32>> {
        self.parsed(key)
    }

    fn u64(&self, key: &str) -> Result<Option<u64>> {
        self.parsed(key)
    }

    fn usize(&self, key: &str) -> Result<Option<usize>> {
        self.parsed(key)
    }

    fn f32(&self, key: &str) -> Result<Option<f32>> {
        self.parsed(key)
    }
}
