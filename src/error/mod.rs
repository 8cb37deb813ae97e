//! Error handling for creator search.
//!
//! This module provides:
//! - [`SearchError`]: The main error enum for all search operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for creator search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding provider transient failure: {0}")]
    EmbeddingTransient(String),

    #[error("Embedding provider rejected request (status {status}): {message}")]
    EmbeddingRejected { status: u16, message: String },

    #[error("Embedding unavailable after {attempts} attempt(s): {reason}")]
    EmbeddingUnavailable { attempts: u32, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimension { expected: usize, actual: usize },

    #[error("Filter '{filter}' could not be evaluated: {reason}")]
    FilterEvaluation { filter: String, reason: String },

    #[error("Creator corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SearchError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmbeddingTransient(_) => ErrorCode::EmbeddingTransient,
            Self::EmbeddingRejected { .. } => ErrorCode::EmbeddingRejected,
            Self::EmbeddingUnavailable { .. } => ErrorCode::EmbeddingUnavailable,
            Self::EmbeddingDimension { .. } => ErrorCode::EmbeddingDimensionMismatch,
            Self::FilterEvaluation { .. } => ErrorCode::FilterInvalid,
            Self::CorpusUnavailable(_) => ErrorCode::CorpusUnavailable,
            Self::InvalidRequest(_) => ErrorCode::SearchQueryInvalid,
            Self::Cache(_) => ErrorCode::CacheError,
            Self::Config(_) | Self::Toml(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Http(e) if e.is_timeout() => ErrorCode::NetworkTimeout,
            Self::Http(_) => ErrorCode::NetworkUnreachable,
        }
    }

    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::EmbeddingTransient(_) | Self::Http(_))
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::EmbeddingRejected { status, .. } => {
                Some(serde_json::json!({ "status": status }))
            }
            Self::EmbeddingUnavailable { attempts, .. } => {
                Some(serde_json::json!({ "attempts": attempts }))
            }
            Self::EmbeddingDimension { expected, actual } => {
                Some(serde_json::json!({ "expected": expected, "actual": actual }))
            }
            Self::FilterEvaluation { filter, reason } => {
                Some(serde_json::json!({ "filter": filter, "reason": reason }))
            }
            Self::CorpusUnavailable(source) => Some(serde_json::json!({ "source": source })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_search_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted as JSON on stdout when the binary runs in robot mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "CORPUS_UNAVAILABLE")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "embedding", "corpus", "config")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a `SearchError`.
    #[must_use]
    pub fn from_search_error(err: &SearchError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&SearchError> for StructuredError {
    fn from(err: &SearchError) -> Self {
        Self::from_search_error(err)
    }
}

/// Result type alias using `SearchError`.
pub type Result<T> = std::result::Result<T, SearchError>;
