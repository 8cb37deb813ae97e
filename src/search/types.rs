//! Request and response shapes for the search entry points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::creator::{Creator, Demographics, Platform};
use crate::search::filters::SearchFilters;
use crate::search::scoring::score_creator;

/// A single search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    /// Defaults to the configured limit; clamped to `[1, max_limit]`.
    pub limit: Option<usize>,
    pub filters: SearchFilters,
    /// Attach each creator's embedding to its result item.
    pub include_embeddings: bool,
    /// Overrides the configured similarity threshold.
    pub threshold: Option<f32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub const fn with_embeddings(mut self) -> Self {
        self.include_embeddings = true;
        self
    }

    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// One ranked creator in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub creator_id: String,
    pub name: String,
    pub handle: String,
    pub platform: Platform,
    pub followers: u64,
    pub engagement_rate: f64,
    pub categories: Vec<String>,
    pub demographics: Demographics,
    pub content_style: String,
    pub location: String,
    pub collaboration_rate: Option<String>,
    pub response_rate: u8,
    /// 0-100; drives ordering.
    pub match_score: f64,
    /// 0-100; informational.
    pub creator_score: f64,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ResultItem {
    #[must_use]
    pub fn from_creator(creator: &Creator, match_score: f64) -> Self {
        Self {
            creator_id: creator.id.clone(),
            name: creator.name.clone(),
            handle: creator.handle.clone(),
            platform: creator.platform.clone(),
            followers: creator.followers,
            engagement_rate: creator.engagement_rate,
            categories: creator.categories.clone(),
            demographics: creator.demographics.clone(),
            content_style: creator.content_style.clone(),
            location: creator.location.clone(),
            collaboration_rate: creator.collaboration_rate.clone(),
            response_rate: creator.response_rate,
            match_score,
            creator_score: score_creator(creator),
            language: creator.language.clone(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Outcome of a search. Empty results carry an `error_message` explaining
/// the likely cause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ResultItem>,
    pub total_found: usize,
    pub query: String,
    pub search_time_ms: f64,
    pub used_cache: bool,
    /// True when the keyword path answered instead of embeddings.
    #[serde(default)]
    pub used_fallback: bool,
    pub filters_applied: Option<SearchFilters>,
    pub error_message: Option<String>,
}

impl SearchResponse {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Several queries sharing filters and a per-query limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSearchRequest {
    pub queries: Vec<String>,
    #[serde(alias = "common_filters")]
    pub filters: SearchFilters,
    pub limit_per_query: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSearchResponse {
    /// Keyed by query text.
    pub results: BTreeMap<String, SearchResponse>,
    pub total_queries: usize,
    pub processing_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_with_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "tech", "filters": {"platform": "YouTube"}}"#).unwrap();
        assert_eq!(request.query, "tech");
        assert_eq!(request.limit, None);
        assert_eq!(request.filters.platform.as_deref(), Some("YouTube"));
        assert!(!request.include_embeddings);
    }

    #[test]
    fn result_item_carries_creator_score() {
        let creator = Creator::new("creator_1", "Sarah", Platform::Instagram)
            .with_followers(150_000)
            .with_engagement_rate(4.2)
            .with_response_rate(85);
        let item = ResultItem::from_creator(&creator, 91.5);
        assert_eq!(item.creator_id, "creator_1");
        assert!((item.creator_score - 78.85).abs() < 1e-9);
        assert!((item.match_score - 91.5).abs() < f64::EPSILON);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["platform"], "Instagram");
        assert!(json.get("embedding").is_none());
    }
}
