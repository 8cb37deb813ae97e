use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::render;
use crate::cli::formatters::format_suggestions;
use crate::error::Result;
use crate::search::suggest::{DEFAULT_SUGGESTIONS, suggest};

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial query text
    pub partial: String,

    /// Maximum number of suggestions
    #[arg(long, short, default_value_t = DEFAULT_SUGGESTIONS)]
    pub limit: usize,
}

#[derive(Serialize)]
struct SuggestOutput<'a> {
    partial: &'a str,
    suggestions: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let output = SuggestOutput {
        partial: &args.partial,
        suggestions: suggest(&args.partial, &ctx.corpus, args.limit),
    };
    render(ctx, &output, Vec::new(), |output| {
        format_suggestions(output.partial, &output.suggestions)
    })
}
