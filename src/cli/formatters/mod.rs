//! Human-readable output for CLI commands. Robot mode bypasses these and
//! serializes the command's data directly.

use std::fmt::Write as _;

use colored::Colorize;

use crate::search::BatchSearchResponse;

mod search_results;

pub use search_results::{SearchResults, format_count};

#[must_use]
pub fn format_suggestions(partial: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return format!("{} No suggestions for '{}'\n", "!".yellow(), partial.cyan());
    }
    suggestions.iter().fold(String::new(), |mut out, suggestion| {
        let _ = writeln!(out, "  {suggestion}");
        out
    })
}

/// Each query's results under its own heading, sorted by query text.
#[must_use]
pub fn format_batch(response: &BatchSearchResponse) -> String {
    let mut out = format!(
        "{} queries in {:.1}ms\n\n",
        response.total_queries.to_string().bold(),
        response.processing_time_ms
    );
    for (query, single) in &response.results {
        let _ = writeln!(out, "{} {}", "==>".blue(), query.bold());
        out.push_str(&SearchResults::new(single).format_human());
        out.push('\n');
    }
    out
}
