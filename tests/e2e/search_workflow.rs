//! E2E Scenario: semantic search with structured and natural-language
//! filters.

use creator_search::search::{SearchFilters, SearchRequest};
use creator_search::test_utils::fixtures::{demo_corpus, fitness_corpus};

use super::fixture::{engine_with, topic_provider};

#[tokio::test]
async fn fitness_query_respects_follower_floor() {
    let provider = topic_provider();
    let engine = engine_with(provider);
    let corpus = fitness_corpus();

    let request = SearchRequest::new("fitness influencer")
        .with_filters(SearchFilters::default().with_min_followers(50_000))
        .with_threshold(0.0);
    let response = engine.search(&request, &corpus).await.unwrap();

    assert!(!response.used_fallback);
    assert!(!response.used_cache);
    assert!(response.error_message.is_none());
    let ids: Vec<&str> = response.results.iter().map(|r| r.creator_id.as_str()).collect();
    assert_eq!(&ids[..2], ["fit_1", "fit_2"]);
    assert!(!ids.contains(&"fit_small"));
    assert!(response.results.iter().all(|r| r.followers >= 50_000));
    assert!(response.results[0].match_score >= 99.9);
    assert!(
        response
            .results
            .windows(2)
            .all(|pair| pair[0].match_score >= pair[1].match_score)
    );
    assert_eq!(response.total_found, response.results.len());
}

#[tokio::test]
async fn location_phrase_becomes_filter() {
    let engine = engine_with(topic_provider());
    let corpus = fitness_corpus();

    let request = SearchRequest::new("fitness creators from Denver").with_threshold(-1.0);
    let response = engine.search(&request, &corpus).await.unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].creator_id, "fit_2");
    let applied = response.filters_applied.unwrap();
    assert_eq!(applied.location.as_deref(), Some("Denver"));
}

#[tokio::test]
async fn unknown_location_explains_itself() {
    let engine = engine_with(topic_provider());
    let corpus = demo_corpus();

    let response = engine
        .search(&SearchRequest::new("creators from Nepal"), &corpus)
        .await
        .unwrap();

    assert!(response.is_empty());
    assert_eq!(response.total_found, 0);
    let message = response.error_message.unwrap();
    assert!(message.starts_with("No creators found from Nepal."), "{message}");
    assert!(message.contains("Austin, TX"));
    assert!(message.contains("Toronto, Canada"));
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let engine = engine_with(topic_provider());
    let err = engine
        .search(&SearchRequest::new("   "), &fitness_corpus())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[tokio::test]
async fn embeddings_returned_on_request() {
    let provider = topic_provider();
    let engine = engine_with(provider.clone());
    let corpus = fitness_corpus();

    let request = SearchRequest::new("fitness")
        .with_threshold(0.5)
        .with_embeddings();
    let response = engine.search(&request, &corpus).await.unwrap();

    assert!(!response.is_empty());
    for item in &response.results {
        let embedding = item.embedding.as_ref().unwrap();
        assert_eq!(embedding.len(), provider.vector("fitness").len());
    }
}
