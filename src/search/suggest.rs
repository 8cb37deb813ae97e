//! Query completion from corpus vocabulary.

use std::collections::BTreeSet;

use crate::core::corpus::Corpus;
use crate::core::creator::Platform;

pub const DEFAULT_SUGGESTIONS: usize = 5;

const COMMON_SEARCHES: [&str; 12] = [
    "fitness influencers",
    "tech reviewers",
    "fashion bloggers",
    "food creators",
    "gaming streamers",
    "beauty gurus",
    "travel influencers",
    "lifestyle creators",
    "educational content",
    "comedy creators",
    "music artists",
    "art creators",
];

/// Suggestions containing `partial` (case-insensitive), drawn from corpus
/// categories, content-style words and word pairs, platform names and
/// common searches. Sorted, at most `limit`.
#[must_use]
pub fn suggest(partial: &str, corpus: &Corpus, limit: usize) -> Vec<String> {
    let needle = partial.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }
    let hit = |candidate: &str| candidate.to_lowercase().contains(&needle);

    let mut suggestions = BTreeSet::new();

    for creator in corpus.iter() {
        suggestions.extend(creator.categories.iter().filter(|c| hit(c)).cloned());

        let words: Vec<&str> = creator
            .content_style
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|w| !w.is_empty())
            .collect();
        for (i, word) in words.iter().enumerate() {
            if !hit(word) {
                continue;
            }
            suggestions.insert((*word).to_string());
            if let Some(next) = words.get(i + 1) {
                suggestions.insert(format!("{word} {next}"));
            }
        }

        let platform = creator.platform.as_str();
        if !platform.is_empty() && hit(platform) {
            suggestions.insert(platform.to_string());
        }
    }

    for platform in Platform::known() {
        if hit(platform.as_str()) {
            suggestions.insert(platform.as_str().to_string());
        }
    }

    suggestions.extend(COMMON_SEARCHES.iter().filter(|s| hit(s)).map(|s| (*s).to_string()));

    suggestions.into_iter().take(limit).collect()
}
