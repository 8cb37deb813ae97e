//! Search results formatter

use std::fmt::Write as _;

use colored::Colorize;

use crate::search::{ResultItem, SearchResponse};

const WRAP_WIDTH: usize = 76;
const INDENT: &str = "     ";

/// Terminal rendering of a search response.
pub struct SearchResults<'a> {
    response: &'a SearchResponse,
}

impl<'a> SearchResults<'a> {
    #[must_use]
    pub const fn new(response: &'a SearchResponse) -> Self {
        Self { response }
    }

    #[must_use]
    pub fn format_human(&self) -> String {
        let response = self.response;
        if response.is_empty() {
            let mut out = format!(
                "{} No creators found for '{}'\n",
                "!".yellow(),
                response.query.cyan()
            );
            if let Some(message) = &response.error_message {
                for line in textwrap::wrap(message, WRAP_WIDTH) {
                    let _ = writeln!(out, "  {line}");
                }
            }
            return out;
        }

        let mut mode = if response.used_fallback { "keyword" } else { "semantic" }.to_string();
        if response.used_cache {
            mode.push_str(", cached");
        }
        let mut out = format!(
            "{} results for '{}' ({mode}) in {:.1}ms:\n\n",
            response.total_found.to_string().bold(),
            response.query.cyan(),
            response.search_time_ms
        );
        push_items(&mut out, &response.results);
        out
    }

    /// A titled list of result items, as used by `similar`.
    #[must_use]
    pub fn listing(title: &str, items: &[ResultItem]) -> String {
        if items.is_empty() {
            return format!("{} {title}: none found\n", "!".yellow());
        }
        let mut out = format!("{}:\n\n", title.bold());
        push_items(&mut out, items);
        out
    }
}

fn push_items(out: &mut String, items: &[ResultItem]) {
    for (i, item) in items.iter().enumerate() {
        let rank = format!("{}.", i + 1);
        let _ = writeln!(
            out,
            "{:4} {} {} {}",
            rank.dimmed(),
            item.name.bold(),
            item.handle.dimmed(),
            item.platform.to_string().blue()
        );
        let _ = writeln!(
            out,
            "{INDENT}{} (match: {:.2}, quality: {:.2})",
            item.creator_id.dimmed(),
            item.match_score,
            item.creator_score
        );
        let _ = writeln!(
            out,
            "{INDENT}{} followers, {:.1}% engagement, {}% response, {}",
            format_count(item.followers),
            item.engagement_rate,
            item.response_rate,
            if item.location.is_empty() { "-" } else { &item.location }
        );
        if !item.categories.is_empty() {
            let _ = writeln!(out, "{INDENT}{}", item.categories.join(", ").green());
        }
        if !item.content_style.is_empty() {
            let options = textwrap::Options::new(WRAP_WIDTH)
                .initial_indent(INDENT)
                .subsequent_indent(INDENT);
            for line in textwrap::wrap(&item.content_style, options) {
                let _ = writeln!(out, "{}", line.dimmed());
            }
        }
        out.push('\n');
    }
}

/// Compact follower count: 1.2M, 450K, 950.
#[must_use]
pub fn format_count(count: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let value = count as f64;
    if count >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.0}K", value / 1_000.0)
    } else {
        count.to_string()
    }
}
