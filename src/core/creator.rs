//! Creator profile data model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::normalize::{
    clean_text, engagement_rate_from_averages, normalize_categories, normalize_handle,
    parse_compact_number, parse_percentage,
};

/// Social platform a creator publishes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Instagram,
    YouTube,
    TikTok,
    Twitch,
    LinkedIn,
    Twitter,
    Facebook,
    Other(String),
}

impl Platform {
    /// Display name as shown in results and canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Instagram => "Instagram",
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Twitch => "Twitch",
            Self::LinkedIn => "LinkedIn",
            Self::Twitter => "Twitter",
            Self::Facebook => "Facebook",
            Self::Other(name) => name,
        }
    }

    /// Parse a platform name case-insensitively. Unknown names are kept as
    /// [`Platform::Other`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "instagram" | "ig" => Self::Instagram,
            "youtube" | "yt" => Self::YouTube,
            "tiktok" => Self::TikTok,
            "twitch" => Self::Twitch,
            "linkedin" => Self::LinkedIn,
            "twitter" | "x" => Self::Twitter,
            "facebook" | "fb" => Self::Facebook,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// All named platforms, in display order.
    #[must_use]
    pub const fn known() -> [Self; 7] {
        [
            Self::Instagram,
            Self::YouTube,
            Self::TikTok,
            Self::Twitch,
            Self::LinkedIn,
            Self::Twitter,
            Self::Facebook,
        ]
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience demographics for a creator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    /// Gender label to audience percentage.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub gender_split: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_locations: Vec<String>,
}

impl Demographics {
    fn is_empty(&self) -> bool {
        self.age_group.as_deref().is_none_or(str::is_empty)
            && self.gender_split.is_empty()
            && self.top_locations.is_empty()
    }
}

/// A creator profile, the unit of search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default, deserialize_with = "lenient_count")]
    pub followers: u64,
    /// Percent, 0-100.
    #[serde(default, deserialize_with = "lenient_rate")]
    pub engagement_rate: f64,
    /// Percent, 0-100. Defaults to 50 when unknown.
    #[serde(default = "default_response_rate", deserialize_with = "lenient_response_rate")]
    pub response_rate: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_likes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_comments: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_shares: Option<f64>,
    #[serde(default)]
    pub content_style: String,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_rate: Option<String>,
    #[serde(default, deserialize_with = "lenient_demographics")]
    pub demographics: Demographics,
    /// Precomputed embedding shipped with the record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

fn default_response_rate() -> u8 {
    50
}

fn default_language() -> String {
    "English".to_string()
}

impl Creator {
    /// Create a creator with the given id, name and platform; everything
    /// else takes its default.
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            handle: String::new(),
            platform,
            followers: 0,
            engagement_rate: 0.0,
            response_rate: default_response_rate(),
            avg_likes: None,
            avg_comments: None,
            avg_shares: None,
            content_style: String::new(),
            categories: Vec::new(),
            location: String::new(),
            language: default_language(),
            collaboration_rate: None,
            demographics: Demographics::default(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    #[must_use]
    pub const fn with_followers(mut self, followers: u64) -> Self {
        self.followers = followers;
        self
    }

    #[must_use]
    pub const fn with_engagement_rate(mut self, rate: f64) -> Self {
        self.engagement_rate = rate;
        self
    }

    #[must_use]
    pub const fn with_response_rate(mut self, rate: u8) -> Self {
        self.response_rate = rate;
        self
    }

    #[must_use]
    pub fn with_content_style(mut self, style: impl Into<String>) -> Self {
        self.content_style = style.into();
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
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Apply ingestion normalization: clean free text, normalize the handle
    /// and categories, derive a missing engagement rate from averages and
    /// clamp rates to `[0, 100]`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = clean_text(&self.name);
        self.handle = normalize_handle(&self.handle);
        self.content_style = clean_text(&self.content_style);
        self.location = clean_text(&self.location);
        self.language = clean_text(&self.language);
        if self.language.is_empty() {
            self.language = default_language();
        }
        self.categories = normalize_categories(&self.categories);
        self.demographics.top_locations = self
            .demographics
            .top_locations
            .iter()
            .map(|loc| clean_text(loc))
            .filter(|loc| !loc.is_empty())
            .collect();

        if self.engagement_rate <= 0.0 && self.followers > 0 {
            let likes = self.avg_likes.unwrap_or(0.0);
            let comments = self.avg_comments.unwrap_or(0.0);
            let shares = self.avg_shares.unwrap_or(0.0);
            if likes + comments + shares > 0.0 {
                self.engagement_rate =
                    engagement_rate_from_averages(likes, comments, shares, self.followers);
            }
        }
        self.engagement_rate = if self.engagement_rate.is_finite() {
            self.engagement_rate.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.response_rate = self.response_rate.min(100);
        self
    }

    /// Whether the creator carries `category` (case-insensitive).
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == category.to_lowercase())
    }

    /// Natural-language projection used as embedding input.
    ///
    /// Sentences are joined with `". "`; absent or zero-valued fields are
    /// left out so sparse records do not embed placeholder text.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        let mut parts = Vec::new();

        if !self.name.is_empty() {
            parts.push(format!("Creator name: {}", self.name));
        }
        if !self.platform.as_str().is_empty() {
            parts.push(format!("Platform: {}", self.platform));
        }
        if !self.content_style.is_empty() {
            parts.push(format!("Content style: {}", self.content_style));
        }
        if !self.categories.is_empty() {
            parts.push(format!("Content categories: {}", self.categories.join(", ")));
        }

        let demo = &self.demographics;
        if let Some(age) = demo.age_group.as_deref().filter(|a| !a.is_empty()) {
            parts.push(format!("Target audience age: {age}"));
        }
        if !demo.gender_split.is_empty() {
            let split = demo
                .gender_split
                .iter()
                .map(|(gender, pct)| format!("{gender}: {pct}%"))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("Audience gender split: {split}"));
        }
        if !demo.top_locations.is_empty() {
            parts.push(format!("Audience locations: {}", demo.top_locations.join(", ")));
        }

        if self.followers > 0 {
            parts.push(format!("Follower count: {}", self.followers));
        }
        if self.engagement_rate > 0.0 {
            parts.push(format!("Engagement rate: {}%", self.engagement_rate));
        }
        if !self.language.is_empty() {
            parts.push(format!("Content language: {}", self.language));
        }
        if !self.location.is_empty() {
            parts.push(format!("Creator location: {}", self.location));
        }

        parts.join(". ")
    }

    /// Demographics as JSON for result payloads; `None` when empty.
    #[must_use]
    pub fn demographics_json(&self) -> Option<serde_json::Value> {
        if self.demographics.is_empty() {
            return None;
        }
        serde_json::to_value(&self.demographics).ok()
    }
}

// =============================================================================
// Lenient deserializers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        Some(NumberOrString::Text(s)) => parse_compact_number(&s).unwrap_or(0),
        _ => 0,
    })
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) if n.is_finite() => n.max(0.0),
        Some(NumberOrString::Text(s)) => parse_percentage(&s).unwrap_or(0.0).max(0.0),
        _ => 0.0,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_response_rate<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rate = match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) if n.is_finite() => Some(n),
        Some(NumberOrString::Text(s)) => parse_percentage(&s),
        _ => None,
    };
    Ok(rate.map_or_else(default_response_rate, |r| r.clamp(0.0, 100.0).round() as u8))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrString {
    List(Vec<String>),
    Text(String),
}

fn lenient_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListOrString>::deserialize(deserializer)? {
        Some(ListOrString::List(list)) => list,
        Some(ListOrString::Text(text)) => text
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    })
}

#[derive(Deserialize)]
struct RawDemographics {
    #[serde(default)]
    age_group: Option<String>,
    #[serde(default)]
    gender_split: BTreeMap<String, NumberOrString>,
    #[serde(default)]
    top_locations: Option<ListOrString>,
}

fn lenient_demographics<'de, D>(deserializer: D) -> Result<Demographics, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawDemographics>::deserialize(deserializer)? else {
        return Ok(Demographics::default());
    };

    let gender_split = raw
        .gender_split
        .into_iter()
        .filter_map(|(gender, pct)| {
            let value = match pct {
                NumberOrString::Number(n) => Some(n),
                NumberOrString::Text(s) => parse_percentage(&s),
            }?;
            Some((gender.to_lowercase(), value))
        })
        .collect();

    let top_locations = match raw.top_locations {
        Some(ListOrString::List(list)) => list,
        Some(ListOrString::Text(text)) => text.split(',').map(|s| s.trim().to_string()).collect(),
        None => Vec::new(),
    };

    Ok(Demographics {
        age_group: raw.age_group.filter(|a| !a.trim().is_empty()),
        gender_split,
        top_locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sarah() -> Creator {
        let mut gender_split = BTreeMap::new();
        gender_split.insert("female".to_string(), 65.0);
        gender_split.insert("male".to_string(), 35.0);
        Creator::new("creator_1", "Sarah Johnson", Platform::Instagram)
            .with_handle("@sarahfitlife")
            .with_followers(150_000)
            .with_engagement_rate(4.2)
            .with_categories(["fitness", "health"])
            .with_content_style("Motivational fitness content")
            .with_location("Los Angeles, CA")
            .with_demographics(Demographics {
                age_group: Some("18-34".to_string()),
                gender_split,
                top_locations: vec!["United States".to_string(), "Canada".to_string()],
            })
    }

    #[test]
    fn test_platform_parse_case_insensitive() {
        assert_eq!(Platform::parse("instagram"), Platform::Instagram);
        assert_eq!(Platform::parse(" YOUTUBE "), Platform::YouTube);
        assert_eq!(Platform::parse("TikTok"), Platform::TikTok);
        assert_eq!(Platform::parse("Mastodon"), Platform::Other("Mastodon".to_string()));
        assert_eq!(Platform::YouTube.to_string(), "YouTube");
    }

    #[test]
    fn test_canonical_text_includes_present_fields_in_order() {
        let text = sarah().canonical_text();
        assert_eq!(
            text,
            "Creator name: Sarah Johnson. Platform: Instagram. \
             Content style: Motivational fitness content. \
             Content categories: fitness, health. Target audience age: 18-34. \
             Audience gender split: female: 65%, male: 35%. \
             Audience locations: United States, Canada. Follower count: 150000. \
             Engagement rate: 4.2%. Content language: English. \
             Creator location: Los Angeles, CA"
        );
    }

    #[test]
    fn test_canonical_text_omits_absent_fields() {
        let creator = Creator::new("c", "Solo", Platform::Twitch).with_language("");
        assert_eq!(creator.canonical_text(), "Creator name: Solo. Platform: Twitch");
    }

    #[test]
    fn test_lenient_deserialization() {
        let json = r#"{
            "id": "c9",
            "name": "Lenient  Lee",
            "platform": "tiktok",
            "followers": "1.2M",
            "engagement_rate": "7.5%",
            "response_rate": "80%",
            "categories": "Dance, dance, Comedy",
            "demographics": {
                "age_group": "16-24",
                "gender_split": {"Female": "70%", "Male": 30},
                "top_locations": "Brazil, Portugal"
            }
        }"#;
        let creator: Creator = serde_json::from_str(json).unwrap();
        assert_eq!(creator.platform, Platform::TikTok);
        assert_eq!(creator.followers, 1_200_000);
        assert!((creator.engagement_rate - 7.5).abs() < 1e-9);
        assert_eq!(creator.response_rate, 80);
        assert_eq!(creator.language, "English");
        assert_eq!(creator.demographics.gender_split.get("female"), Some(&70.0));
        assert_eq!(creator.demographics.top_locations, vec!["Brazil", "Portugal"]);

        let creator = creator.normalized();
        assert_eq!(creator.name, "Lenient Lee");
        assert_eq!(creator.categories, vec!["Dance", "Comedy"]);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let creator: Creator = serde_json::from_str(r#"{"id": "bare"}"#).unwrap();
        assert_eq!(creator.response_rate, 50);
        assert_eq!(creator.followers, 0);
        assert!(creator.categories.is_empty());
        assert!(creator.embedding.is_none());
    }

    #[test]
    fn test_normalized_derives_and_clamps_engagement() {
        let mut creator = Creator::new("c", "Derived", Platform::Instagram).with_followers(10_000);
        creator.avg_likes = Some(400.0);
        creator.avg_comments = Some(100.0);
        let creator = creator.normalized();
        assert!((creator.engagement_rate - 5.0).abs() < 1e-9);

        let clamped = Creator::new("c", "Huge", Platform::Instagram)
            .with_engagement_rate(250.0)
            .normalized();
        assert!((clamped.engagement_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_has_category_ignores_case() {
        let creator = sarah();
        assert!(creator.has_category("FITNESS"));
        assert!(!creator.has_category("gaming"));
    }
}
