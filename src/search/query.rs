//! Natural-language filter hints.
//!
//! Queries such as "fitness creators from Miami" carry filters inside the
//! text. Two phrasings are recognized:
//! - `from X`: everything after the last standalone "from" becomes a
//!   location hint.
//! - `X influencers` / `X creators`: `X` becomes a category hint when the
//!   corpus has that category, or a location hint when some corpus location
//!   contains it.
//!
//! This is a heuristic. A wrong hint narrows the search and usually ends in
//! an empty result whose message lists what the corpus actually holds.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::corpus::Corpus;
use crate::search::filters::SearchFilters;

static FROM_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").expect("from pattern is valid"));

static PLURAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([\p{L}][\p{L}&'-]*)\s+(?:influencers|creators)\b")
        .expect("plural subject pattern is valid")
});

const STOPWORDS: [&str; 4] = ["show", "me", "the", "all"];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.iter().any(|s| s.eq_ignore_ascii_case(word))
}

/// Filters extracted from query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryHints {
    pub location: Option<String>,
    pub categories: Vec<String>,
}

impl QueryHints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.categories.is_empty()
    }

    #[must_use]
    pub fn to_filters(&self) -> SearchFilters {
        SearchFilters {
            location: self.location.clone(),
            categories: self.categories.clone(),
            ..SearchFilters::default()
        }
    }
}

/// Location named by a `from X` phrase, if any.
///
/// Only the text after the last "from" counts. Trailing punctuation and
/// leading stopwords are removed; nothing left means no hint.
#[must_use]
pub fn location_after_from(query: &str) -> Option<String> {
    let last = FROM_WORD.find_iter(query).last()?;
    let mut words: Vec<&str> = query[last.end()..]
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .split_whitespace()
        .collect();

    let leading = words.iter().take_while(|w| is_stopword(w)).count();
    words.drain(..leading);

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Extract location and category hints from `query`, resolving plural
/// subjects against what `corpus` contains.
#[must_use]
pub fn extract_hints(query: &str, corpus: &Corpus) -> QueryHints {
    let mut hints = QueryHints {
        location: location_after_from(query),
        categories: Vec::new(),
    };

    let categories = corpus.distinct_categories();
    let locations = corpus.distinct_locations();

    for captures in PLURAL_SUBJECT.captures_iter(query) {
        let Some(word) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if is_stopword(word) {
            continue;
        }
        let lowered = word.to_lowercase();

        if categories.iter().any(|c| *c == lowered) {
            if !hints.categories.contains(&lowered) {
                hints.categories.push(lowered);
            }
        } else if hints.location.is_none()
            && locations
                .iter()
                .any(|loc| loc.to_lowercase().contains(&lowered))
        {
            hints.location = Some(word.to_string());
        }
    }

    if !hints.is_empty() {
        debug!(?hints, "extracted query hints");
    }
    hints
}
