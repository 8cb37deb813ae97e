//! Normalization helpers for ingested creator data.
//!
//! Scraped and hand-entered creator records disagree on formats: handles
//! arrive as URLs, follower counts as "1.5M", rates as "4.2%". These helpers
//! turn them into the shapes the search core expects.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Profile URL prefixes stripped from handles.
static HANDLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.)?(?:instagram\.com/|youtube\.com/@?|tiktok\.com/@|twitter\.com/|x\.com/|twitch\.tv/|linkedin\.com/in/)",
    )
    .expect("handle prefix pattern is valid")
});

/// Strip `@` and platform profile URL prefixes from a handle.
#[must_use]
pub fn normalize_handle(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = HANDLE_PREFIX.replace(trimmed, "");
    without_prefix
        .trim_start_matches('@')
        .trim_end_matches('/')
        .trim()
        .to_string()
}

/// Parse a follower-style count such as `150000`, `"150K"`, `"1.5M"`,
/// `"2B"` or `"1,200"`.
///
/// Returns `None` for negative or unparseable input.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_compact_number(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect::<String>()
        .to_uppercase();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).trunc() as u64)
}

/// Parse a percentage such as `"4.2%"` or `"4.2"`.
#[must_use]
pub fn parse_percentage(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('%').trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Collapse runs of whitespace and apply NFKC normalization.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    normalized.split_whitespace().join(" ")
}

/// Trim, drop empty labels and deduplicate case-insensitively.
///
/// The first-seen casing of each label is kept.
#[must_use]
pub fn normalize_categories<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .map(|label| clean_text(label.as_ref()))
        .filter(|label| !label.is_empty())
        .unique_by(|label| label.to_lowercase())
        .collect()
}

/// Engagement rate (percent) derived from average interactions.
///
/// Shares count double. Returns 0 when there are no followers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate_from_averages(likes: f64, comments: f64, shares: f64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    let total = shares.mul_add(2.0, likes + comments);
    round2(total / followers as f64 * 100.0)
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
