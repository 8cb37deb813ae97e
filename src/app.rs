//! Per-invocation application context: configuration, corpus snapshot and
//! search engine.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cli::Cli;
use crate::config::Config;
use crate::core::corpus::{Corpus, CorpusProvider, JsonFileCorpus, SqliteCorpus, StaticCorpus};
use crate::error::Result;
use crate::search::{SearchEngine, build_provider};

pub struct AppContext {
    pub config: Config,
    pub corpus: Corpus,
    pub engine: SearchEngine,
    pub robot_mode: bool,
    pub quiet: bool,
}

impl AppContext {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &cwd)?;
        config.validate()?;

        let provider = corpus_provider(cli.corpus.as_deref())?;
        let corpus = provider.snapshot().await?;
        debug!(source = %provider.describe(), creators = corpus.len(), "corpus ready");

        let embedder = build_provider(&config.embedding)?;
        let engine = SearchEngine::new(&config, embedder);

        Ok(Self {
            config,
            corpus,
            engine,
            robot_mode: cli.robot,
            quiet: cli.quiet,
        })
    }
}

/// Pick a corpus provider by file extension; the bundled demo creators
/// when no path is given.
pub fn corpus_provider(path: Option<&Path>) -> Result<Arc<dyn CorpusProvider>> {
    let Some(path) = path else {
        return Ok(Arc::new(StaticCorpus::demo()?));
    };
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    Ok(match extension.as_str() {
        "db" | "sqlite" | "sqlite3" => Arc::new(SqliteCorpus::new(path)),
        _ => Arc::new(JsonFileCorpus::new(path)),
    })
}
