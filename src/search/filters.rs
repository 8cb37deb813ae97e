//! Structured search filters.
//!
//! Filters are applied to similarity (or keyword) candidates in score order:
//! - Platform (case-insensitive exact)
//! - Follower and engagement bounds (inclusive)
//! - Categories (any-match, case-insensitive)
//! - Location, language, audience age group (case-insensitive substring)
//! - Minimum response rate (inclusive)
//!
//! Every predicate is optional. Filters arriving as loose JSON are parsed
//! per field; a malformed value drops only its own predicate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::core::creator::{Creator, Platform};
use crate::core::normalize::{normalize_categories, parse_compact_number, parse_percentage};
use crate::error::SearchError;

/// Search filters for narrowing results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_engagement_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_engagement_rate: Option<f64>,
    /// Any-match: a creator passes with at least one of these categories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_rate_min: Option<u8>,
}

impl SearchFilters {
    /// Create new empty filters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    #[must_use]
    pub const fn with_min_followers(mut self, min: u64) -> Self {
        self.min_followers = Some(min);
        self
    }

    #[must_use]
    pub const fn with_max_followers(mut self, max: u64) -> Self {
        self.max_followers = Some(max);
        self
    }

    #[must_use]
    pub const fn with_min_engagement_rate(mut self, min: f64) -> Self {
        self.min_engagement_rate = Some(min);
        self
    }

    #[must_use]
    pub const fn with_max_engagement_rate(mut self, max: f64) -> Self {
        self.max_engagement_rate = Some(max);
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_age_group(mut self, age_group: impl Into<String>) -> Self {
        self.age_group = Some(age_group.into());
        self
    }

    #[must_use]
    pub const fn with_response_rate_min(mut self, min: u8) -> Self {
        self.response_rate_min = Some(min);
        self
    }

    /// Check if any filters are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platform.is_none()
            && self.min_followers.is_none()
            && self.max_followers.is_none()
            && self.min_engagement_rate.is_none()
            && self.max_engagement_rate.is_none()
            && self.categories.is_empty()
            && self.location.is_none()
            && self.language.is_none()
            && self.age_group.is_none()
            && self.response_rate_min.is_none()
    }

    /// Normalized copy for cache keys: text trimmed, blank strings dropped,
    /// categories lower-cased, deduplicated and sorted.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        let mut categories: Vec<String> = normalize_categories(&self.categories)
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
        categories.sort();

        Self {
            platform: text(&self.platform),
            min_followers: self.min_followers,
            max_followers: self.max_followers,
            min_engagement_rate: self.min_engagement_rate,
            max_engagement_rate: self.max_engagement_rate,
            categories,
            location: text(&self.location),
            language: text(&self.language),
            age_group: text(&self.age_group),
            response_rate_min: self.response_rate_min,
        }
    }

    /// Fill every predicate left unset here from `hints`. Values already
    /// present win.
    #[must_use]
    pub fn merged_with(mut self, hints: &Self) -> Self {
        fn fill<T: Clone>(slot: &mut Option<T>, hint: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(hint);
            }
        }

        fill(&mut self.platform, &hints.platform);
        fill(&mut self.min_followers, &hints.min_followers);
        fill(&mut self.max_followers, &hints.max_followers);
        fill(&mut self.min_engagement_rate, &hints.min_engagement_rate);
        fill(&mut self.max_engagement_rate, &hints.max_engagement_rate);
        fill(&mut self.location, &hints.location);
        fill(&mut self.language, &hints.language);
        fill(&mut self.age_group, &hints.age_group);
        fill(&mut self.response_rate_min, &hints.response_rate_min);
        if self.categories.is_empty() {
            self.categories.clone_from(&hints.categories);
        }
        self
    }

    /// Check if a creator passes all filters
    #[must_use]
    pub fn matches(&self, creator: &Creator) -> bool {
        if let Some(platform) = non_blank(self.platform.as_deref()) {
            let wanted = Platform::parse(platform);
            if !wanted
                .as_str()
                .eq_ignore_ascii_case(creator.platform.as_str())
            {
                return false;
            }
        }

        if self.min_followers.is_some_and(|min| creator.followers < min) {
            return false;
        }
        if self.max_followers.is_some_and(|max| creator.followers > max) {
            return false;
        }

        // NaN bounds compare false and therefore never exclude.
        if self
            .min_engagement_rate
            .is_some_and(|min| creator.engagement_rate < min)
        {
            return false;
        }
        if self
            .max_engagement_rate
            .is_some_and(|max| creator.engagement_rate > max)
        {
            return false;
        }

        let wanted: Vec<&str> = self
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if !wanted.is_empty() && !wanted.iter().any(|c| creator.has_category(c)) {
            return false;
        }

        if let Some(location) = non_blank(self.location.as_deref()) {
            if !contains_ignore_case(&creator.location, location) {
                return false;
            }
        }

        if let Some(language) = non_blank(self.language.as_deref()) {
            if !contains_ignore_case(&creator.language, language) {
                return false;
            }
        }

        if let Some(age_group) = non_blank(self.age_group.as_deref()) {
            let matched = creator
                .demographics
                .age_group
                .as_deref()
                .is_some_and(|actual| contains_ignore_case(actual, age_group));
            if !matched {
                return false;
            }
        }

        if self
            .response_rate_min
            .is_some_and(|min| creator.response_rate < min)
        {
            return false;
        }

        true
    }

    /// Parse filters from loose JSON.
    ///
    /// Numbers may arrive as numbers or strings (`"50K"`, `"4.5%"`),
    /// categories as an array or a comma-separated string. A field that
    /// cannot be read is skipped with a warning and reported in the returned
    /// list; the remaining predicates still apply. Unknown keys are ignored.
    #[must_use]
    pub fn from_json_lenient(value: &Value) -> (Self, Vec<SearchError>) {
        let mut filters = Self::default();
        let mut skipped = Vec::new();

        let object = match value {
            Value::Null => return (filters, skipped),
            Value::Object(object) => object,
            other => {
                skipped.push(skip("filters", format!("expected an object, got {other}")));
                return (filters, skipped);
            }
        };

        let mut field = |name: &str, parsed: Option<std::result::Result<(), String>>| {
            if let Some(Err(reason)) = parsed {
                skipped.push(skip(name, reason));
            }
        };

        field(
            "platform",
            read(object, "platform", as_text).map(|v| v.map(|p| filters.platform = Some(p))),
        );
        field(
            "min_followers",
            read(object, "min_followers", as_count).map(|v| v.map(|n| filters.min_followers = Some(n))),
        );
        field(
            "max_followers",
            read(object, "max_followers", as_count).map(|v| v.map(|n| filters.max_followers = Some(n))),
        );
        field(
            "min_engagement_rate",
            read(object, "min_engagement_rate", as_rate)
                .map(|v| v.map(|r| filters.min_engagement_rate = Some(r))),
        );
        field(
            "max_engagement_rate",
            read(object, "max_engagement_rate", as_rate)
                .map(|v| v.map(|r| filters.max_engagement_rate = Some(r))),
        );
        field(
            "categories",
            read(object, "categories", as_categories).map(|v| v.map(|c| filters.categories = c)),
        );
        field(
            "location",
            read(object, "location", as_text).map(|v| v.map(|l| filters.location = Some(l))),
        );
        field(
            "language",
            read(object, "language", as_text).map(|v| v.map(|l| filters.language = Some(l))),
        );
        field(
            "age_group",
            read(object, "age_group", as_text).map(|v| v.map(|a| filters.age_group = Some(a))),
        );
        field(
            "response_rate_min",
            read(object, "response_rate_min", as_response_rate)
                .map(|v| v.map(|r| filters.response_rate_min = Some(r))),
        );

        for err in &skipped {
            warn!(error = %err, "skipping malformed filter");
        }
        (filters, skipped)
    }
}

fn skip(filter: &str, reason: String) -> SearchError {
    SearchError::FilterEvaluation {
        filter: filter.to_string(),
        reason,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `None` when the key is absent or null, otherwise the parse outcome.
fn read<T>(
    object: &Map<String, Value>,
    key: &str,
    parse: fn(&Value) -> std::result::Result<T, String>,
) -> Option<std::result::Result<T, String>> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse(value)),
    }
}

fn as_text(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::String(_) => Err("empty string".to_string()),
        other => Err(format!("expected a string, got {other}")),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> std::result::Result<u64, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .ok_or_else(|| format!("not a non-negative count: {n}")),
        Value::String(s) => parse_compact_number(s).ok_or_else(|| format!("not a count: {s:?}")),
        other => Err(format!("expected a number, got {other}")),
    }
}

fn as_rate(value: &Value) -> std::result::Result<f64, String> {
    let rate = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_percentage(s),
        _ => None,
    };
    rate.filter(|r| r.is_finite() && *r >= 0.0)
        .ok_or_else(|| format!("not a non-negative rate: {value}"))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_response_rate(value: &Value) -> std::result::Result<u8, String> {
    let rate = as_rate(value)?;
    if rate > 100.0 {
        return Err(format!("response rate above 100: {rate}"));
    }
    Ok(rate.ceil() as u8)
}

fn as_categories(value: &Value) -> std::result::Result<Vec<String>, String> {
    match value {
        Value::String(s) => Ok(normalize_categories(s.split(','))),
        Value::Array(items) => {
            let labels: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if labels.len() != items.len() {
                return Err("categories must all be strings".to_string());
            }
            Ok(normalize_categories(labels))
        }
        other => Err(format!("expected a list of categories, got {other}")),
    }
}
