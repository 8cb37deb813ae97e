//! Match and quality scores.
//!
//! `match_score` drives ordering and comes from either vector similarity or
//! keyword overlap. `creator_score` is informational only.

use std::collections::BTreeSet;

use crate::core::creator::Creator;
use crate::core::normalize::round2;

/// Keyword overlap weights, summing to 100.
pub const CATEGORY_WEIGHT: f64 = 40.0;
pub const CONTENT_STYLE_WEIGHT: f64 = 30.0;
pub const NAME_WEIGHT: f64 = 20.0;
pub const PLATFORM_WEIGHT: f64 = 10.0;

/// Fixed content-quality contribution to the creator score.
pub const CONTENT_QUALITY_BASELINE: f64 = 20.0;

/// Lower-cased alphanumeric tokens of `text`.
#[must_use]
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Creator quality score in `[0, 100]`.
///
/// Engagement up to 10% earns up to 30 points, followers up to 25 points on a
/// log10 scale, response rate up to 25 points, plus a fixed 20-point content
/// baseline. Negative or non-finite inputs count as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn creator_score(engagement_rate: f64, followers: u64, response_rate: f64) -> f64 {
    let engagement_rate = sanitize(engagement_rate);
    let response_rate = sanitize(response_rate).min(100.0);

    let engagement = (engagement_rate / 10.0 * 30.0).min(30.0);
    let reach = ((followers.max(1) as f64).log10() * 5.0).min(25.0);
    let responsiveness = response_rate / 100.0 * 25.0;

    round2((engagement + reach + responsiveness + CONTENT_QUALITY_BASELINE).clamp(0.0, 100.0))
}

/// Creator score from a profile.
#[must_use]
pub fn score_creator(creator: &Creator) -> f64 {
    creator_score(
        creator.engagement_rate,
        creator.followers,
        f64::from(creator.response_rate),
    )
}

/// Similarity mapped onto the 0-100 match scale.
#[must_use]
pub fn similarity_to_match_score(similarity: f32) -> f64 {
    round2(f64::from(similarity) * 100.0)
}

/// Weighted keyword overlap between query tokens and a creator, in `[0, 100]`.
///
/// - categories: share of query tokens found in the creator's categories
/// - content style: share of query tokens found in the content style
/// - name: share of query tokens found in the name
/// - platform: query names the creator's platform
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn keyword_score(query_tokens: &BTreeSet<String>, creator: &Creator) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }

    let query_len = query_tokens.len() as f64;
    let mut score = 0.0;

    let categories = tokenize(&creator.categories.join(" "));
    let category_hits = query_tokens.intersection(&categories).count();
    score += CATEGORY_WEIGHT * category_hits as f64 / query_len;

    let style = tokenize(&creator.content_style);
    let style_hits = query_tokens.intersection(&style).count();
    score += CONTENT_STYLE_WEIGHT * style_hits as f64 / query_len;

    let name = tokenize(&creator.name);
    let name_hits = query_tokens.intersection(&name).count();
    score += NAME_WEIGHT * name_hits as f64 / query_len;

    let platform = creator.platform.as_str().to_lowercase();
    if !platform.is_empty() && query_tokens.contains(&platform) {
        score += PLATFORM_WEIGHT;
    }

    round2(score.min(100.0))
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
