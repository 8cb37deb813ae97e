//! Config layering as seen by the search engine.

use std::collections::HashMap;
use std::sync::Arc;

use creator_search::config::Config;
use creator_search::search::{SearchEngine, SearchRequest, SimilarityMetric};
use creator_search::test_utils::CountingProvider;
use creator_search::test_utils::fixtures::demo_corpus;
use tempfile::TempDir;

fn load(dir: &TempDir, toml: Option<&str>, env: &[(&str, &str)]) -> creator_search::Result<Config> {
    if let Some(toml) = toml {
        std::fs::write(dir.path().join("csearch.toml"), toml).unwrap();
    }
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let explicit = toml.map(|_| dir.path().join("csearch.toml"));
    Config::load_with_env(explicit.as_deref(), dir.path(), |key| env.get(key).cloned())
}

#[test]
fn file_then_env_precedence() {
    let dir = TempDir::new().unwrap();
    let config = load(
        &dir,
        Some("[search]\ndefault_limit = 4\nmetric = \"euclidean\"\n\n[embedding]\ndims = 32\n"),
        &[("CSEARCH_DEFAULT_LIMIT", "6")],
    )
    .unwrap();

    assert_eq!(config.search.default_limit, 6);
    assert_eq!(config.search.metric, SimilarityMetric::Euclidean);
    assert_eq!(config.embedding.dims, 32);
    assert_eq!(config.search.max_limit, 50);
}

#[test]
fn out_of_range_threshold_rejected() {
    let dir = TempDir::new().unwrap();
    let err = load(&dir, None, &[("CSEARCH_THRESHOLD", "1.5")]).unwrap_err();
    assert!(err.to_string().contains("similarity_threshold"));
}

#[tokio::test]
async fn disabled_cache_never_reports_hits() {
    let dir = TempDir::new().unwrap();
    let mut config = load(&dir, None, &[("CSEARCH_CACHE_DISABLED", "true")]).unwrap();
    config.embedding.dims = 16;
    config.embedding.batch_pause_ms = 0;

    let provider = Arc::new(CountingProvider::new(16));
    let engine = SearchEngine::new(&config, provider.clone());
    let corpus = demo_corpus();
    let request = SearchRequest::new("fitness");

    engine.search(&request, &corpus).await.unwrap();
    let first_calls = provider.calls();
    let second = engine.search(&request, &corpus).await.unwrap();

    assert!(!second.used_cache);
    assert_eq!(provider.calls(), first_calls * 2);
}

#[tokio::test]
async fn default_limit_applies_when_unset() {
    let dir = TempDir::new().unwrap();
    let mut config = load(&dir, None, &[("CSEARCH_DEFAULT_LIMIT", "2")]).unwrap();
    config.embedding.dims = 16;
    config.embedding.batch_pause_ms = 0;

    let engine = SearchEngine::new(&config, Arc::new(CountingProvider::new(16)));
    let request = SearchRequest::new("lifestyle").with_threshold(-1.0);
    let response = engine.search(&request, &demo_corpus()).await.unwrap();
    assert_eq!(response.results.len(), 2);
}
