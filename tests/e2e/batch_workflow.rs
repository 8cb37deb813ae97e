//! E2E Scenario: batch search and similar creators.

use std::sync::Arc;

use creator_search::search::BatchSearchRequest;
use creator_search::test_utils::CountingProvider;
use creator_search::test_utils::fixtures::{DIMS, demo_corpus, fitness_corpus};

use super::fixture::{engine_with, topic_provider};

#[tokio::test]
async fn batch_keys_results_by_query() {
    let engine = engine_with(Arc::new(CountingProvider::new(DIMS)));
    let request = BatchSearchRequest {
        queries: vec!["tech".to_string(), "gaming".to_string()],
        limit_per_query: Some(2),
        ..BatchSearchRequest::default()
    };

    let response = engine.batch_search(&request, &demo_corpus()).await.unwrap();

    assert_eq!(response.total_queries, 2);
    assert_eq!(response.results.len(), 2);
    for single in response.results.values() {
        assert!(single.results.len() <= 2);
    }
}

#[tokio::test]
async fn batch_rejects_eleven_queries() {
    let engine = engine_with(Arc::new(CountingProvider::new(DIMS)));
    let request = BatchSearchRequest {
        queries: (0..11).map(|i| format!("query {i}")).collect(),
        ..BatchSearchRequest::default()
    };
    assert!(engine.batch_search(&request, &demo_corpus()).await.is_err());
}

#[tokio::test]
async fn similar_creators_share_topic() {
    let engine = engine_with(topic_provider());
    let corpus = fitness_corpus();

    let similar = engine.similar_creators("fit_1", &corpus, 2).await;

    assert_eq!(similar.len(), 2);
    assert!(similar.iter().all(|item| item.creator_id != "fit_1"));
    assert!(similar[0].categories.iter().any(|c| c == "fitness"));
}

#[tokio::test]
async fn similar_to_unknown_creator_is_empty() {
    let engine = engine_with(topic_provider());
    assert!(
        engine
            .similar_creators("nobody", &fitness_corpus(), 3)
            .await
            .is_empty()
    );
}
