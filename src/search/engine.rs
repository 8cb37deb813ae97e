//! Search orchestrator.
//!
//! A request moves through: validation and hint extraction, result-cache
//! lookup, the embedding path (query embedding, creator embeddings,
//! similarity scan, filters in score order), and finally packaging and
//! write-back. If the query cannot be embedded the whole request is answered
//! by keyword overlap instead. Empty results carry a message naming the
//! filter that most likely emptied them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::{CacheStore, EmbeddingCache, MemoryCacheStore, ResultCache};
use crate::config::{Config, SearchConfig};
use crate::core::corpus::Corpus;
use crate::core::creator::Platform;
use crate::core::recovery::RetryConfig;
use crate::error::{Result, SearchError};
use crate::search::adapter::EmbeddingAdapter;
use crate::search::embeddings::EmbeddingProvider;
use crate::search::filters::SearchFilters;
use crate::search::index::VectorIndex;
use crate::search::query::extract_hints;
use crate::search::scoring::{keyword_score, similarity_to_match_score, tokenize};
use crate::search::types::{
    BatchSearchRequest, BatchSearchResponse, ResultItem, SearchRequest, SearchResponse,
};

/// Bounds on batch requests.
pub const MAX_BATCH_QUERIES: usize = 10;
pub const MAX_BATCH_LIMIT: usize = 20;
pub const DEFAULT_BATCH_LIMIT: usize = 5;

/// How many alternatives an empty-result message lists.
const LISTED_ALTERNATIVES: usize = 5;

/// A validated request with hints merged into its filters.
#[derive(Debug, Clone)]
struct SearchPlan {
    query: String,
    filters: SearchFilters,
    limit: usize,
    threshold: f32,
    include_embeddings: bool,
}

/// Creator search over a corpus snapshot.
#[derive(Clone)]
pub struct SearchEngine {
    config: SearchConfig,
    adapter: EmbeddingAdapter,
    results: Option<ResultCache>,
}

impl SearchEngine {
    /// Engine with an in-memory cache store (when caching is enabled).
    pub fn new(config: &Config, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let store = config.cache.enabled.then(|| {
            Arc::new(MemoryCacheStore::new(config.cache.max_entries)) as Arc<dyn CacheStore>
        });
        Self::with_store(config, provider, store)
    }

    /// Engine backed by `store` for both embedding and result caching, or
    /// uncached when `store` is `None`.
    pub fn with_store(
        config: &Config,
        provider: Arc<dyn EmbeddingProvider>,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        let embeddings = store.as_ref().map(|store| {
            EmbeddingCache::new(
                Arc::clone(store),
                Duration::from_secs(config.cache.embedding_ttl_secs),
            )
        });
        let results = store.map(|store| {
            ResultCache::new(store, Duration::from_secs(config.cache.result_ttl_secs))
        });

        Self {
            config: config.search.clone(),
            adapter: EmbeddingAdapter::new(provider, embeddings, &config.embedding),
            results,
        }
    }

    /// Replace the embedding retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.adapter = self.adapter.with_retry(retry);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub const fn adapter(&self) -> &EmbeddingAdapter {
        &self.adapter
    }

    /// Run a search.
    ///
    /// Only a malformed request is an error. Embedding and cache failures
    /// degrade, and an empty result comes back with `error_message` set.
    #[instrument(
        skip(self, request, corpus),
        fields(request_id = %Uuid::new_v4(), query = %request.query)
    )]
    pub async fn search(&self, request: &SearchRequest, corpus: &Corpus) -> Result<SearchResponse> {
        let plan = self.plan(request, corpus)?;
        Ok(self.execute(&plan, corpus).await)
    }

    /// Keyword-overlap search with the same validation and hint handling as
    /// [`search`](Self::search). This is exactly what `search` returns when
    /// the embedding provider is down.
    pub fn keyword_search(&self, request: &SearchRequest, corpus: &Corpus) -> Result<SearchResponse> {
        let started = Instant::now();
        let plan = self.plan(request, corpus)?;
        let results = keyword_results(&plan.query, corpus, &plan.filters, plan.limit);
        Ok(package(&plan, corpus, results, started, true))
    }

    /// Creators most similar to `creator_id`, excluding itself. Unknown ids
    /// yield an empty list.
    pub async fn similar_creators(
        &self,
        creator_id: &str,
        corpus: &Corpus,
        count: usize,
    ) -> Vec<ResultItem> {
        let Some(reference) = corpus.get(creator_id) else {
            debug!(creator_id, "similar: unknown creator");
            return Vec::new();
        };

        let count = count.clamp(1, self.config.max_limit.max(1));
        let plan = SearchPlan {
            query: reference.canonical_text(),
            filters: SearchFilters::default(),
            limit: count + 1,
            threshold: self.config.similarity_threshold,
            include_embeddings: false,
        };

        self.execute(&plan, corpus)
            .await
            .results
            .into_iter()
            .filter(|item| item.creator_id != creator_id)
            .take(count)
            .collect()
    }

    /// Run several queries with shared filters, one after another.
    pub async fn batch_search(
        &self,
        request: &BatchSearchRequest,
        corpus: &Corpus,
    ) -> Result<BatchSearchResponse> {
        let started = Instant::now();

        if request.queries.is_empty() || request.queries.len() > MAX_BATCH_QUERIES {
            return Err(SearchError::InvalidRequest(format!(
                "batch search takes 1 to {MAX_BATCH_QUERIES} queries, got {}",
                request.queries.len()
            )));
        }
        let limit = request.limit_per_query.unwrap_or(DEFAULT_BATCH_LIMIT);
        if !(1..=MAX_BATCH_LIMIT).contains(&limit) {
            return Err(SearchError::InvalidRequest(format!(
                "limit_per_query must be between 1 and {MAX_BATCH_LIMIT}, got {limit}"
            )));
        }

        let mut response = BatchSearchResponse {
            total_queries: request.queries.len(),
            ..BatchSearchResponse::default()
        };
        for query in &request.queries {
            let single = SearchRequest::new(query.clone())
                .with_limit(limit)
                .with_filters(request.filters.clone());
            let result = self.search(&single, corpus).await?;
            response.results.insert(query.clone(), result);
        }
        response.processing_time_ms = elapsed_ms(started);
        Ok(response)
    }

    fn plan(&self, request: &SearchRequest, corpus: &Corpus) -> Result<SearchPlan> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidRequest("query must not be empty".to_string()));
        }
        let length = query.chars().count();
        if length > self.config.max_query_length {
            return Err(SearchError::InvalidRequest(format!(
                "query is {length} characters; the maximum is {}",
                self.config.max_query_length
            )));
        }

        let max_limit = self.config.max_limit.max(1);
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, max_limit);

        let hints = extract_hints(query, corpus);
        let filters = request.filters.clone().merged_with(&hints.to_filters());

        Ok(SearchPlan {
            query: query.to_string(),
            filters,
            limit,
            threshold: request.threshold.unwrap_or(self.config.similarity_threshold),
            include_embeddings: request.include_embeddings,
        })
    }

    async fn execute(&self, plan: &SearchPlan, corpus: &Corpus) -> SearchResponse {
        let started = Instant::now();

        let cache_key = self.result_cache_key(plan);
        if let (Some(cache), Some(key)) = (&self.results, &cache_key) {
            if let Some(mut cached) = cache.get(key).await {
                debug!(key = %key, "result cache hit");
                cached.used_cache = true;
                cached.query.clone_from(&plan.query);
                cached.search_time_ms = elapsed_ms(started);
                return cached;
            }
        }

        if corpus.is_empty() {
            return package(plan, corpus, Vec::new(), started, false);
        }

        match self.semantic_results(plan, corpus).await {
            Ok(results) => {
                let response = package(plan, corpus, results, started, false);
                if let (Some(cache), Some(key)) = (&self.results, &cache_key) {
                    cache.put(key, &response).await;
                }
                info!(
                    found = response.total_found,
                    elapsed_ms = response.search_time_ms,
                    "search complete"
                );
                response
            }
            Err(err) => {
                warn!(error = %err, "embedding path failed, using keyword search");
                let results = keyword_results(&plan.query, corpus, &plan.filters, plan.limit);
                let response = package(plan, corpus, results, started, true);
                info!(
                    found = response.total_found,
                    elapsed_ms = response.search_time_ms,
                    "keyword search complete"
                );
                response
            }
        }
    }

    /// Responses carrying embeddings are not cached.
    fn result_cache_key(&self, plan: &SearchPlan) -> Option<String> {
        if self.results.is_none() || plan.include_embeddings {
            return None;
        }
        match ResultCache::key(&plan.query, plan.limit, &plan.filters, plan.threshold) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(error = %err, "could not build result cache key");
                None
            }
        }
    }

    async fn semantic_results(&self, plan: &SearchPlan, corpus: &Corpus) -> Result<Vec<ResultItem>> {
        let query_vector = self.adapter.embed_query(&plan.query).await?;

        let mut index = VectorIndex::new(self.config.metric);
        for (id, vector) in self.adapter.embed_creators(corpus.creators()).await {
            index.insert(id, vector);
        }

        let candidates = index.search(&query_vector, plan.limit.saturating_mul(2), plan.threshold);
        debug!(candidates = candidates.len(), "similarity scan");

        let mut results = Vec::with_capacity(plan.limit);
        for candidate in candidates {
            let Some(creator) = corpus.get(&candidate.id) else {
                continue;
            };
            if !plan.filters.matches(creator) {
                continue;
            }
            let mut item = ResultItem::from_creator(creator, similarity_to_match_score(candidate.score));
            if plan.include_embeddings {
                if let Some(vector) = index.get(&candidate.id) {
                    item = item.with_embedding(vector.to_vec());
                }
            }
            results.push(item);
            if results.len() == plan.limit {
                break;
            }
        }
        Ok(results)
    }
}

/// Score every creator by keyword overlap, keep positive scores that pass
/// `filters`, best first (ties by id), at most `limit`.
#[must_use]
pub fn keyword_results(
    query: &str,
    corpus: &Corpus,
    filters: &SearchFilters,
    limit: usize,
) -> Vec<ResultItem> {
    let tokens = tokenize(query);
    corpus
        .iter()
        .filter(|creator| filters.matches(creator))
        .map(|creator| (keyword_score(&tokens, creator), creator))
        .filter(|(score, _)| *score > 0.0)
        .sorted_by(|(a_score, a), (b_score, b)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.id.cmp(&b.id))
        })
        .take(limit)
        .map(|(score, creator)| ResultItem::from_creator(creator, score))
        .collect()
}

fn package(
    plan: &SearchPlan,
    corpus: &Corpus,
    results: Vec<ResultItem>,
    started: Instant,
    used_fallback: bool,
) -> SearchResponse {
    let error_message = results
        .is_empty()
        .then(|| explain_empty(&plan.query, &plan.filters, corpus));

    SearchResponse {
        total_found: results.len(),
        results,
        query: plan.query.clone(),
        search_time_ms: elapsed_ms(started),
        used_cache: false,
        used_fallback,
        filters_applied: (!plan.filters.is_empty()).then(|| plan.filters.clone()),
        error_message,
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// "a, b, c, d, e and 3 more"
fn list_alternatives(values: &[String]) -> String {
    let shown = values.iter().take(LISTED_ALTERNATIVES).join(", ");
    if values.len() > LISTED_ALTERNATIVES {
        format!("{shown} and {} more", values.len() - LISTED_ALTERNATIVES)
    } else {
        shown
    }
}

/// Human-readable reason for an empty result, checking the filters most
/// likely to have excluded everything first.
#[must_use]
pub fn explain_empty(query: &str, filters: &SearchFilters, corpus: &Corpus) -> String {
    if corpus.is_empty() {
        return "No creators are available to search.".to_string();
    }

    if let Some(location) = filters.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        let needle = location.to_lowercase();
        if !corpus
            .iter()
            .any(|c| c.location.to_lowercase().contains(&needle))
        {
            return format!(
                "No creators found from {location}. Available locations include: {}",
                list_alternatives(&corpus.distinct_locations())
            );
        }
    }

    if let Some(platform) = filters.platform.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let wanted = Platform::parse(platform);
        if !corpus
            .iter()
            .any(|c| c.platform.as_str().eq_ignore_ascii_case(wanted.as_str()))
        {
            let platforms: Vec<String> = corpus
                .iter()
                .map(|c| c.platform.to_string())
                .filter(|p| !p.is_empty())
                .sorted()
                .dedup()
                .collect();
            return format!(
                "No creators found on {platform}. Available platforms include: {}",
                list_alternatives(&platforms)
            );
        }
    }

    if !filters.categories.is_empty()
        && !corpus
            .iter()
            .any(|c| filters.categories.iter().any(|cat| c.has_category(cat)))
    {
        return format!(
            "No creators found in {}. Available categories include: {}",
            filters.categories.join(", "),
            list_alternatives(&corpus.category_labels())
        );
    }

    if let (Some(min), Some(max)) = (filters.min_followers, corpus.max_followers()) {
        if min > max {
            return format!(
                "No creators with at least {min} followers. The highest follower count available is {max}."
            );
        }
    }

    if let (Some(min), Some(max)) = (filters.min_engagement_rate, corpus.max_engagement_rate()) {
        if min > max {
            return format!(
                "No creators with an engagement rate of at least {min}%. The highest engagement rate available is {max}%."
            );
        }
    }

    if let (Some(min), Some(max)) = (filters.response_rate_min, corpus.max_response_rate()) {
        if min > max {
            return format!(
                "No creators with a response rate of at least {min}%. The highest response rate available is {max}%."
            );
        }
    }

    if filters.is_empty() {
        format!(
            "No creators matched \"{query}\". Try different keywords or a lower similarity threshold."
        )
    } else {
        format!(
            "No creators matched \"{query}\" with the applied filters. Try broadening the filters or the query."
        )
    }
}
