//! csearch search - Rank creators against a natural-language query
//!
//! Embedding similarity first; keyword overlap when the embedding provider
//! is unavailable or `--keyword-only` is given.

use clap::Args;

use crate::app::AppContext;
use crate::cli::FilterArgs;
use crate::cli::commands::render;
use crate::cli::formatters::SearchResults;
use crate::error::Result;
use crate::search::SearchRequest;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query, e.g. "fitness creators from Austin"
    pub query: String,

    /// Maximum number of results (default from config)
    #[arg(long, short)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Minimum similarity in [-1, 1] (default from config)
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f32>,

    /// Include creator embeddings in the results
    #[arg(long)]
    pub include_embeddings: bool,

    /// Skip embeddings and rank by keyword overlap only
    #[arg(long)]
    pub keyword_only: bool,
}

impl SearchArgs {
    fn to_request(&self) -> Result<(SearchRequest, Vec<String>)> {
        let (filters, warnings) = self.filters.to_filters()?;
        let mut request = SearchRequest::new(self.query.clone()).with_filters(filters);
        request.limit = self.limit;
        request.threshold = self.threshold;
        request.include_embeddings = self.include_embeddings;
        Ok((request, warnings))
    }
}

pub async fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let (request, warnings) = args.to_request()?;
    let response = if args.keyword_only {
        ctx.engine.keyword_search(&request, &ctx.corpus)?
    } else {
        ctx.engine.search(&request, &ctx.corpus).await?
    };
    render(ctx, &response, warnings, |response| {
        SearchResults::new(response).format_human()
    })
}
