//! Corpus and configuration fixtures.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::corpus::Corpus;
use crate::core::creator::{Creator, Demographics, Platform};

/// Embedding dimension used throughout the tests.
pub const DIMS: usize = 64;

/// Config tuned for tests: small vectors, no retry delays or batch pauses.
#[must_use]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.embedding.dims = DIMS;
    config.embedding.initial_delay_ms = 0;
    config.embedding.batch_pause_ms = 0;
    config
}

/// The five bundled demo creators.
///
/// # Panics
///
/// If the bundled data file does not parse.
#[must_use]
pub fn demo_corpus() -> Corpus {
    Corpus::demo().expect("bundled demo corpus parses")
}

/// Five creators, two of them in fitness, one with a stored embedding of the
/// wrong length so it is always re-embedded.
#[must_use]
pub fn fitness_corpus() -> Corpus {
    Corpus::new(vec![
        Creator::new("fit_1", "Sarah Johnson", Platform::Instagram)
            .with_followers(150_000)
            .with_engagement_rate(4.2)
            .with_categories(["fitness", "health"])
            .with_content_style("fitness workouts and healthy habits")
            .with_location("Los Angeles, CA"),
        Creator::new("fit_2", "Mike Torres", Platform::YouTube)
            .with_followers(90_000)
            .with_engagement_rate(7.5)
            .with_categories(["fitness", "nutrition"])
            .with_content_style("strength training fitness programs")
            .with_location("Denver, CO"),
        Creator::new("tech_1", "Alex Chen", Platform::YouTube)
            .with_followers(300_000)
            .with_engagement_rate(6.8)
            .with_categories(["technology"])
            .with_content_style("gadget reviews")
            .with_location("Toronto, Canada"),
        Creator::new("fashion_1", "Maria Rodriguez", Platform::TikTok)
            .with_followers(450_000)
            .with_engagement_rate(8.5)
            .with_categories(["fashion"])
            .with_content_style("style tips")
            .with_location("Miami, FL"),
        Creator::new("fit_small", "Jo Park", Platform::Twitch)
            .with_followers(20_000)
            .with_engagement_rate(12.0)
            .with_categories(["fitness"])
            .with_content_style("live fitness classes")
            .with_location("Austin, TX")
            .with_demographics(Demographics {
                age_group: Some("18-24".to_string()),
                ..Demographics::default()
            })
            .with_embedding(vec![1.0; 3]),
    ])
}

/// Topic vocabulary matching [`fitness_corpus`].
#[must_use]
pub fn fitness_topics() -> Vec<&'static str> {
    vec!["fitness", "technology", "fashion", "gaming", "food"]
}

/// Write `creators` as a JSON array to `dir/name` and return the path.
///
/// # Panics
///
/// If the file cannot be written.
pub fn write_corpus_file(dir: &Path, name: &str, creators: &[Creator]) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(creators).expect("creators serialize");
    std::fs::write(&path, json).expect("corpus file written");
    path
}
