//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Embedding errors
//! - 2xx: Corpus errors
//! - 3xx: Config errors
//! - 4xx: Search errors
//! - 5xx: Network errors
//! - 6xx: Storage/cache errors
//! - 9xx: IO errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `CorpusUnavailable` -> E201).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Embedding errors (1xx)
    // ========================================
    /// E101: Provider hiccup, eligible for retry
    EmbeddingTransient,
    /// E102: Provider refused the request (auth, quota, bad input)
    EmbeddingRejected,
    /// E103: Provider could not produce an embedding after all retries
    EmbeddingUnavailable,
    /// E104: Provider returned a vector of the wrong length
    EmbeddingDimensionMismatch,

    // ========================================
    // Corpus errors (2xx)
    // ========================================
    /// E201: Creator data source cannot be read or decoded
    CorpusUnavailable,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Search request failed validation
    SearchQueryInvalid,
    /// E402: A filter value could not be evaluated
    FilterInvalid,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach remote server
    NetworkUnreachable,
    /// E502: Network request timed out
    NetworkTimeout,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Cache store operation failed
    CacheError,
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // IO errors (9xx)
    // ========================================
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `CorpusUnavailable` -> 201).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::EmbeddingTransient => 101,
            Self::EmbeddingRejected => 102,
            Self::EmbeddingUnavailable => 103,
            Self::EmbeddingDimensionMismatch => 104,

            Self::CorpusUnavailable => 201,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::SearchQueryInvalid => 401,
            Self::FilterInvalid => 402,

            Self::NetworkUnreachable => 501,
            Self::NetworkTimeout => 502,

            Self::CacheError => 601,
            Self::DatabaseError => 604,
            Self::SerializationError => 605,

            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E201").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::EmbeddingTransient => "The embedding provider is flaky. The request will be retried automatically",
            Self::EmbeddingRejected => "Check the API key named by embedding.api_key_env and the configured model",
            Self::EmbeddingUnavailable => "The embedding provider is unreachable. Results fall back to keyword search",
            Self::EmbeddingDimensionMismatch => "Set embedding.dims to the dimension produced by the configured model",

            Self::CorpusUnavailable => "Check that the corpus file or database exists and holds valid creator records",

            Self::ConfigInvalid => "Check TOML syntax in the config file and CSEARCH_* environment variables",
            Self::ConfigMissingRequired => "Set the missing config value in csearch.toml or the environment",

            Self::SearchQueryInvalid => "Queries must be 1-500 characters after trimming",
            Self::FilterInvalid => "Filter values must match the documented types. The filter was skipped",

            Self::NetworkUnreachable => "Check your network connection and the embedding endpoint URL",
            Self::NetworkTimeout => "The remote server is slow. Increase embedding.timeout_secs",

            Self::CacheError => "The cache store failed. Searches continue without caching",
            Self::DatabaseError => "Check the SQLite corpus file and its creators table",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",

            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::EmbeddingTransient
            | Self::EmbeddingRejected
            | Self::EmbeddingUnavailable
            | Self::EmbeddingDimensionMismatch
            | Self::CorpusUnavailable
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::SearchQueryInvalid
            | Self::FilterInvalid
            | Self::NetworkUnreachable
            | Self::NetworkTimeout
            | Self::CacheError
            | Self::IoError => true,

            Self::DatabaseError | Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "embedding",
            2 => "corpus",
            3 => "config",
            4 => "search",
            5 => "network",
            6 => "storage",
            9 => "io",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::EmbeddingTransient,
            Self::EmbeddingRejected,
            Self::EmbeddingUnavailable,
            Self::EmbeddingDimensionMismatch,
            Self::CorpusUnavailable,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SearchQueryInvalid,
            Self::FilterInvalid,
            Self::NetworkUnreachable,
            Self::NetworkTimeout,
            Self::CacheError,
            Self::DatabaseError,
            Self::SerializationError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::EmbeddingTransient.numeric(), 101);
        assert_eq!(ErrorCode::CorpusUnavailable.numeric(), 201);
        assert_eq!(ErrorCode::ConfigInvalid.numeric(), 302);
        assert_eq!(ErrorCode::FilterInvalid.numeric(), 402);
        assert_eq!(ErrorCode::IoError.numeric(), 906);
    }

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::CorpusUnavailable.code_string(), "E201");
        assert_eq!(format!("{}", ErrorCode::FilterInvalid), "E402");
    }

    #[test]
    fn test_all_codes_have_suggestions_and_categories() {
        for code in ErrorCode::all() {
            assert!(!code.suggestion().is_empty(), "{code:?} has no suggestion");
            assert_ne!(code.category(), "unknown", "{code:?} has no category");
        }
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::EmbeddingUnavailable).unwrap();
        assert_eq!(json, "\"EMBEDDING_UNAVAILABLE\"");

        let parsed: ErrorCode = serde_json::from_str("\"CORPUS_UNAVAILABLE\"").unwrap();
        assert_eq!(parsed, ErrorCode::CorpusUnavailable);
    }

    #[test]
    fn test_category_assignment() {
        assert_eq!(ErrorCode::EmbeddingRejected.category(), "embedding");
        assert_eq!(ErrorCode::CorpusUnavailable.category(), "corpus");
        assert_eq!(ErrorCode::NetworkTimeout.category(), "network");
        assert_eq!(ErrorCode::CacheError.category(), "storage");
    }

    #[test]
    fn test_recoverable_categorization() {
        assert!(ErrorCode::CorpusUnavailable.is_recoverable());
        assert!(!ErrorCode::DatabaseError.is_recoverable());
    }
}
