//! E2E Scenario: repeated queries are answered from the result cache
//! without touching the provider.

use std::sync::Arc;
use std::time::Duration;

use creator_search::search::{SearchFilters, SearchRequest};
use creator_search::cache::CacheStore;
use creator_search::search::SearchEngine;
use creator_search::test_utils::fixtures::{DIMS, demo_corpus};
use creator_search::test_utils::{CountingProvider, FailingCacheStore};

use super::fixture::{config_for, engine_with};

#[tokio::test]
async fn second_identical_search_hits_cache() {
    let provider = Arc::new(CountingProvider::new(DIMS));
    let engine = engine_with(provider.clone());
    let corpus = demo_corpus();
    let request = SearchRequest::new("lifestyle content").with_threshold(-1.0);

    let first = engine.search(&request, &corpus).await.unwrap();
    let calls_after_first = provider.calls();
    let second = engine.search(&request, &corpus).await.unwrap();

    assert!(!first.used_cache);
    assert!(second.used_cache);
    assert_eq!(provider.calls(), calls_after_first);
    let first_ids: Vec<_> = first.results.iter().map(|r| &r.creator_id).collect();
    let second_ids: Vec<_> = second.results.iter().map(|r| &r.creator_id).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn cache_hit_is_faster_than_embedding() {
    let provider = Arc::new(CountingProvider::new(DIMS).with_latency(Duration::from_millis(25)));
    let engine = engine_with(provider.clone());
    let corpus = demo_corpus();
    let request = SearchRequest::new("fitness influencer with high engagement");

    let first = engine.search(&request, &corpus).await.unwrap();
    let second = engine.search(&request, &corpus).await.unwrap();

    assert!(second.used_cache);
    // the first search waits on at least the query embedding
    assert!(first.search_time_ms >= 25.0, "{}", first.search_time_ms);
    assert!(
        second.search_time_ms < first.search_time_ms,
        "{} !< {}",
        second.search_time_ms,
        first.search_time_ms
    );
}

#[tokio::test]
async fn creator_embeddings_reused_across_queries() {
    let provider = Arc::new(CountingProvider::new(DIMS));
    let engine = engine_with(provider.clone());
    let corpus = demo_corpus();

    engine
        .search(&SearchRequest::new("tech"), &corpus)
        .await
        .unwrap();
    let after_first = provider.calls();
    assert_eq!(after_first, corpus.len() + 1);

    engine
        .search(&SearchRequest::new("gaming"), &corpus)
        .await
        .unwrap();
    assert_eq!(provider.calls(), after_first + 1);
}

#[tokio::test]
async fn different_filters_miss_cache() {
    let provider = Arc::new(CountingProvider::new(DIMS));
    let engine = engine_with(provider);
    let corpus = demo_corpus();

    let plain = SearchRequest::new("lifestyle");
    let filtered = SearchRequest::new("lifestyle")
        .with_filters(SearchFilters::default().with_platform("Instagram"));

    engine.search(&plain, &corpus).await.unwrap();
    let response = engine.search(&filtered, &corpus).await.unwrap();
    assert!(!response.used_cache);
}

#[tokio::test]
async fn broken_cache_store_degrades_to_misses() {
    let provider = Arc::new(CountingProvider::new(DIMS));
    let config = config_for(provider.as_ref());
    let store: Arc<dyn CacheStore> = Arc::new(FailingCacheStore);
    let engine = SearchEngine::with_store(&config, provider.clone(), Some(store));
    let corpus = demo_corpus();
    let request = SearchRequest::new("lifestyle").with_threshold(-1.0);

    let first = engine.search(&request, &corpus).await.unwrap();
    let second = engine.search(&request, &corpus).await.unwrap();

    assert!(!first.is_empty());
    assert!(!second.used_cache);
    assert!(!second.used_fallback);
    assert_eq!(provider.calls(), 2 * (corpus.len() + 1));
}
