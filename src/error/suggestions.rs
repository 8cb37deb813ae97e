//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the offending value when the error carries context.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
///
/// Falls back to [`ErrorCode::suggestion`] when the context is missing the
/// fields a richer hint needs.
#[must_use]
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::CorpusUnavailable => suggest_corpus_unavailable(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing_required(context),
        ErrorCode::EmbeddingRejected => suggest_embedding_rejected(context),
        ErrorCode::EmbeddingDimensionMismatch => suggest_dimension_mismatch(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn context_u64(context: Option<&Value>, key: &str) -> Option<u64> {
    context.and_then(|c| c.get(key)).and_then(Value::as_u64)
}

fn suggest_corpus_unavailable(context: Option<&Value>) -> String {
    match context_str(context, "source") {
        Some(source) => format!(
            "Could not read creators from {source}. Check the path passed to --corpus, or omit it to use the built-in demo corpus"
        ),
        None => ErrorCode::CorpusUnavailable.suggestion().to_string(),
    }
}

fn suggest_config_missing_required(context: Option<&Value>) -> String {
    match context_str(context, "config_key") {
        Some(key) => format!(
            "Set '{key}' in csearch.toml or export the matching CSEARCH_* environment variable"
        ),
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}

fn suggest_embedding_rejected(context: Option<&Value>) -> String {
    match context_u64(context, "status") {
        Some(401 | 403) => {
            "The API key was refused. Check the variable named by embedding.api_key_env".to_string()
        }
        Some(404) => "The embedding model was not found. Check embedding.model".to_string(),
        _ => ErrorCode::EmbeddingRejected.suggestion().to_string(),
    }
}

fn suggest_dimension_mismatch(context: Option<&Value>) -> String {
    match context_u64(context, "actual") {
        Some(actual) => format!("The provider returns {actual}-dimensional vectors. Set embedding.dims = {actual}"),
        None => ErrorCode::EmbeddingDimensionMismatch.suggestion().to_string(),
    }
}
