//! E2E Scenario: the embedding provider is down and search degrades to
//! keyword overlap.

use std::sync::Arc;

use creator_search::search::{SearchFilters, SearchRequest};
use creator_search::test_utils::FailingProvider;
use creator_search::test_utils::fixtures::{DIMS, demo_corpus};

use super::fixture::engine_with;

#[tokio::test]
async fn provider_outage_matches_keyword_search() {
    let provider = Arc::new(FailingProvider::new(DIMS));
    let engine = engine_with(provider.clone());
    let corpus = demo_corpus();

    let request = SearchRequest::new("tech reviews").with_limit(3);
    let degraded = engine.search(&request, &corpus).await.unwrap();
    let keyword = engine.keyword_search(&request, &corpus).unwrap();

    assert!(degraded.used_fallback);
    assert!(provider.calls() >= 1);
    let degraded_ids: Vec<_> = degraded.results.iter().map(|r| &r.creator_id).collect();
    let keyword_ids: Vec<_> = keyword.results.iter().map(|r| &r.creator_id).collect();
    assert_eq!(degraded_ids, keyword_ids);
    assert_eq!(degraded.results[0].creator_id, "creator_2");
    let scores: Vec<f64> = degraded.results.iter().map(|r| r.match_score).collect();
    let expected: Vec<f64> = keyword.results.iter().map(|r| r.match_score).collect();
    assert_eq!(scores, expected);
}

#[tokio::test]
async fn fallback_applies_filters() {
    let engine = engine_with(Arc::new(FailingProvider::new(DIMS)));
    let corpus = demo_corpus();

    let request = SearchRequest::new("lifestyle")
        .with_filters(SearchFilters::default().with_location("Miami"));
    let response = engine.search(&request, &corpus).await.unwrap();

    assert!(response.used_fallback);
    assert!(
        response
            .results
            .iter()
            .all(|r| r.location.to_lowercase().contains("miami"))
    );
}

#[tokio::test]
async fn fallback_with_no_overlap_is_empty_with_message() {
    let engine = engine_with(Arc::new(FailingProvider::new(DIMS)));
    let response = engine
        .search(&SearchRequest::new("zzqx"), &demo_corpus())
        .await
        .unwrap();
    assert!(response.used_fallback);
    assert!(response.is_empty());
    assert!(response.error_message.is_some());
}
