//! Engines wired to scripted providers over the fixture corpora.

use std::sync::Arc;

use creator_search::config::Config;
use creator_search::search::SearchEngine;
use creator_search::search::embeddings::EmbeddingProvider;
use creator_search::test_utils::TopicProvider;
use creator_search::test_utils::fixtures::{fitness_topics, test_config};
use creator_search::test_utils::logging::init_test_tracing;

/// Test config sized for `provider`.
pub fn config_for(provider: &dyn EmbeddingProvider) -> Config {
    init_test_tracing();
    let mut config = test_config();
    config.embedding.dims = provider.dims();
    config
}

pub fn engine_with<P>(provider: Arc<P>) -> SearchEngine
where
    P: EmbeddingProvider + 'static,
{
    let config = config_for(provider.as_ref());
    SearchEngine::new(&config, provider)
}

pub fn topic_provider() -> Arc<TopicProvider> {
    Arc::new(TopicProvider::new(fitness_topics()))
}
