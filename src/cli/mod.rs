//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::search::SearchFilters;

pub mod commands;
pub mod formatters;
pub mod output;

/// Creator search - rank creator profiles against a natural-language query
#[derive(Parser, Debug)]
#[command(name = "csearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit JSON on stdout for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/csearch/config.toml, then ./csearch.toml)
    #[arg(long, global = true, env = "CSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Creator corpus: .json, .yaml/.yml or .db/.sqlite (default: bundled demo creators)
    #[arg(long, global = true, env = "CSEARCH_CORPUS")]
    pub corpus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search creators with a natural-language query
    Search(commands::search::SearchArgs),

    /// Find creators similar to a given creator
    Similar(commands::similar::SimilarArgs),

    /// Suggest query completions from the corpus vocabulary
    Suggest(commands::suggest::SuggestArgs),

    /// Run several queries with shared filters
    Batch(commands::batch::BatchArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

/// Structured filters shared by `search` and `batch`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Platform (instagram, youtube, tiktok, twitch, ...)
    #[arg(long)]
    pub platform: Option<String>,

    /// Minimum follower count (accepts 50K, 1.2M)
    #[arg(long, value_parser = parse_count)]
    pub min_followers: Option<u64>,

    /// Maximum follower count
    #[arg(long, value_parser = parse_count)]
    pub max_followers: Option<u64>,

    /// Minimum engagement rate in percent
    #[arg(long)]
    pub min_engagement: Option<f64>,

    /// Maximum engagement rate in percent
    #[arg(long)]
    pub max_engagement: Option<f64>,

    /// Categories, any of which must match (comma-separated)
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub category: Vec<String>,

    /// Location substring
    #[arg(long)]
    pub location: Option<String>,

    /// Language substring
    #[arg(long)]
    pub language: Option<String>,

    /// Audience age group substring (e.g. 18-34)
    #[arg(long)]
    pub age_group: Option<String>,

    /// Minimum response rate in percent
    #[arg(long)]
    pub min_response_rate: Option<u8>,

    /// Filters as a JSON object; flags above override its fields
    #[arg(long, value_name = "JSON")]
    pub filters: Option<String>,
}

impl FilterArgs {
    /// Combine `--filters` JSON with the individual flags. Malformed JSON
    /// fields are skipped; the returned strings describe what was skipped.
    pub fn to_filters(&self) -> Result<(SearchFilters, Vec<String>)> {
        let (base, skipped) = match &self.filters {
            Some(raw) => {
                let value: serde_json::Value = serde_json::from_str(raw)?;
                SearchFilters::from_json_lenient(&value)
            }
            None => (SearchFilters::default(), Vec::new()),
        };

        let flags = SearchFilters {
            platform: self.platform.clone(),
            min_followers: self.min_followers,
            max_followers: self.max_followers,
            min_engagement_rate: self.min_engagement,
            max_engagement_rate: self.max_engagement,
            categories: self.category.clone(),
            location: self.location.clone(),
            language: self.language.clone(),
            age_group: self.age_group.clone(),
            response_rate_min: self.min_response_rate,
        };

        let warnings = skipped.iter().map(ToString::to_string).collect();
        Ok((flags.merged_with(&base), warnings))
    }
}

fn parse_count(raw: &str) -> std::result::Result<u64, String> {
    crate::core::normalize::parse_compact_number(raw)
        .ok_or_else(|| format!("not a follower count: {raw}"))
}
