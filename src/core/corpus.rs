//! Read-only creator corpus snapshots and the providers that produce them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, Row};
use serde::Deserialize;
use tracing::{debug, warn};

use super::creator::{Creator, Demographics, Platform};
use crate::error::{Result, SearchError};

const DEMO_CREATORS: &str = include_str!("../../data/demo_creators.json");

/// Immutable snapshot of the creators considered by one search.
///
/// Creators keep their ingestion order; ids are unique (later duplicates are
/// dropped).
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    creators: Vec<Creator>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    pub fn new(creators: impl IntoIterator<Item = Creator>) -> Self {
        let mut corpus = Self::default();
        for creator in creators {
            if creator.id.is_empty() {
                warn!(name = %creator.name, "skipping creator without id");
                continue;
            }
            if corpus.by_id.contains_key(&creator.id) {
                warn!(id = %creator.id, "skipping duplicate creator id");
                continue;
            }
            corpus.by_id.insert(creator.id.clone(), corpus.creators.len());
            corpus.creators.push(creator);
        }
        corpus
    }

    /// The bundled five-creator demo corpus.
    pub fn demo() -> Result<Self> {
        let creators = parse_document(DEMO_CREATORS, DocumentFormat::Json)
            .map_err(|err| SearchError::CorpusUnavailable(format!("demo corpus: {err}")))?;
        Ok(Self::new(creators.into_iter().map(Creator::normalized)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Creator> {
        self.by_id.get(id).map(|&idx| &self.creators[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creator> {
        self.creators.iter()
    }

    #[must_use]
    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }

    /// Distinct non-empty creator locations, sorted.
    #[must_use]
    pub fn distinct_locations(&self) -> Vec<String> {
        self.creators
            .iter()
            .map(|c| c.location.trim())
            .filter(|loc| !loc.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct categories compared case-insensitively, lower-cased and sorted.
    #[must_use]
    pub fn distinct_categories(&self) -> Vec<String> {
        self.creators
            .iter()
            .flat_map(|c| c.categories.iter())
            .map(|cat| cat.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct categories for display, keeping the casing of the first
    /// occurrence and ordered case-insensitively.
    #[must_use]
    pub fn category_labels(&self) -> Vec<String> {
        let mut labels: BTreeMap<String, &str> = BTreeMap::new();
        for category in self.creators.iter().flat_map(|c| c.categories.iter()) {
            let category = category.trim();
            if !category.is_empty() {
                labels.entry(category.to_lowercase()).or_insert(category);
            }
        }
        labels.into_values().map(str::to_string).collect()
    }

    #[must_use]
    pub fn max_followers(&self) -> Option<u64> {
        self.creators.iter().map(|c| c.followers).max()
    }

    #[must_use]
    pub fn max_engagement_rate(&self) -> Option<f64> {
        self.creators
            .iter()
            .map(|c| c.engagement_rate)
            .max_by(f64::total_cmp)
    }

    #[must_use]
    pub fn max_response_rate(&self) -> Option<u8> {
        self.creators.iter().map(|c| c.response_rate).max()
    }
}

impl FromIterator<Creator> for Corpus {
    fn from_iter<T: IntoIterator<Item = Creator>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Source of creator records.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Read every creator. Failures surface as [`SearchError::CorpusUnavailable`].
    async fn list_creators(&self) -> Result<Vec<Creator>>;

    /// Human-readable description of the source for logs and errors.
    fn describe(&self) -> String;

    /// Read the creators into a [`Corpus`] snapshot.
    async fn snapshot(&self) -> Result<Corpus> {
        let creators = self.list_creators().await?;
        let corpus = Corpus::new(creators);
        debug!(source = %self.describe(), creators = corpus.len(), "loaded corpus snapshot");
        Ok(corpus)
    }
}

/// In-memory provider.
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    creators: Vec<Creator>,
}

impl StaticCorpus {
    pub fn new(creators: Vec<Creator>) -> Self {
        Self { creators }
    }

    /// Provider over the bundled demo creators.
    pub fn demo() -> Result<Self> {
        Ok(Self::new(Corpus::demo()?.creators))
    }
}

#[async_trait]
impl CorpusProvider for StaticCorpus {
    async fn list_creators(&self) -> Result<Vec<Creator>> {
        Ok(self.creators.clone())
    }

    fn describe(&self) -> String {
        format!("static corpus ({} creators)", self.creators.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// A corpus file is either a list of creators or a map keyed by creator id.
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusDocument {
    List(Vec<Creator>),
    Map(BTreeMap<String, Creator>),
}

fn parse_document(raw: &str, format: DocumentFormat) -> Result<Vec<Creator>> {
    let document: CorpusDocument = match format {
        DocumentFormat::Json => serde_json::from_str(raw)?,
        DocumentFormat::Yaml => serde_yaml::from_str(raw)?,
    };
    Ok(match document {
        CorpusDocument::List(list) => list,
        CorpusDocument::Map(map) => map
            .into_iter()
            .map(|(key, mut creator)| {
                if creator.id.is_empty() {
                    creator.id = key;
                }
                creator
            })
            .collect(),
    })
}

/// Provider reading a JSON or YAML file (`.yaml`/`.yml`), normalizing each
/// record on load.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CorpusProvider for JsonFileCorpus {
    async fn list_creators(&self) -> Result<Vec<Creator>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            SearchError::CorpusUnavailable(format!("read {}: {err}", self.path.display()))
        })?;
        let creators = parse_document(&raw, DocumentFormat::from_path(&self.path)).map_err(|err| {
            SearchError::CorpusUnavailable(format!("parse {}: {err}", self.path.display()))
        })?;
        Ok(creators.into_iter().map(Creator::normalized).collect())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Provider reading the `creators` table of a SQLite database.
///
/// `categories`, `demographics` and `embedding` columns hold JSON text.
#[derive(Debug, Clone)]
pub struct SqliteCorpus {
    path: PathBuf,
}

impl SqliteCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(path: &Path) -> Result<Vec<Creator>> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, handle, platform, followers, engagement_rate, categories, \
             demographics, content_style, language, location, collaboration_rate, \
             response_rate, embedding \
             FROM creators ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], creator_from_row)?;
        let mut creators = Vec::new();
        for row in rows {
            creators.push(row?.normalized());
        }
        Ok(creators)
    }
}

#[async_trait]
impl CorpusProvider for SqliteCorpus {
    async fn list_creators(&self) -> Result<Vec<Creator>> {
        let path = self.path.clone();
        if !path.exists() {
            return Err(SearchError::CorpusUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        tokio::task::spawn_blocking(move || Self::read_all(&path))
            .await
            .map_err(|err| SearchError::CorpusUnavailable(format!("sqlite reader task: {err}")))?
            .map_err(|err| {
                SearchError::CorpusUnavailable(format!("{}: {err}", self.path.display()))
            })
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn creator_from_row(row: &Row<'_>) -> rusqlite::Result<Creator> {
    let id: String = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    let platform: Option<String> = row.get(3)?;

    let mut creator = Creator::new(
        id,
        name.unwrap_or_default(),
        Platform::parse(&platform.unwrap_or_default()),
    );
    creator.handle = row.get::<_, Option<String>>(2)?.unwrap_or_default();
    creator.followers = row.get::<_, Option<i64>>(4)?.unwrap_or(0).max(0) as u64;
    creator.engagement_rate = row.get::<_, Option<f64>>(5)?.unwrap_or(0.0);
    creator.categories = json_column(row.get(6)?, &creator.id, "categories").unwrap_or_default();
    creator.demographics =
        json_column::<Demographics>(row.get(7)?, &creator.id, "demographics").unwrap_or_default();
    creator.content_style = row.get::<_, Option<String>>(8)?.unwrap_or_default();
    if let Some(language) = row.get::<_, Option<String>>(9)?.filter(|l| !l.is_empty()) {
        creator.language = language;
    }
    creator.location = row.get::<_, Option<String>>(10)?.unwrap_or_default();
    creator.collaboration_rate = row.get(11)?;
    if let Some(rate) = row.get::<_, Option<i64>>(12)? {
        creator.response_rate = rate.clamp(0, 100) as u8;
    }
    creator.embedding = json_column(row.get(13)?, &creator.id, "embedding");
    Ok(creator)
}

fn json_column<T: serde::de::DeserializeOwned>(
    raw: Option<String>,
    id: &str,
    column: &str,
) -> Option<T> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(id, column, error = %err, "ignoring malformed JSON column");
            None
        }
    }
}
