//! csearch batch - Several queries with shared filters
//!
//! Queries come from positional arguments or from a JSON request file
//! (`{"queries": [...], "filters": {...}, "limit_per_query": 5}`); both may
//! be combined, file queries first.

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::FilterArgs;
use crate::cli::commands::render;
use crate::cli::formatters::format_batch;
use crate::error::{Result, SearchError};
use crate::search::BatchSearchRequest;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Queries to run
    pub queries: Vec<String>,

    /// Results per query (1-20, default 5)
    #[arg(long)]
    pub limit_per_query: Option<usize>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Read a batch request from a JSON file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl BatchArgs {
    fn to_request(&self) -> Result<(BatchSearchRequest, Vec<String>)> {
        let mut request = match &self.file {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    SearchError::InvalidRequest(format!("read {}: {err}", path.display()))
                })?;
                serde_json::from_str::<BatchSearchRequest>(&raw)?
            }
            None => BatchSearchRequest::default(),
        };

        let (flags, warnings) = self.filters.to_filters()?;
        request.filters = flags.merged_with(&request.filters);
        request.queries.extend(self.queries.iter().cloned());
        if self.limit_per_query.is_some() {
            request.limit_per_query = self.limit_per_query;
        }
        Ok((request, warnings))
    }
}

pub async fn run(ctx: &AppContext, args: &BatchArgs) -> Result<()> {
    let (request, warnings) = args.to_request()?;
    let response = ctx.engine.batch_search(&request, &ctx.corpus).await?;
    render(ctx, &response, warnings, format_batch)
}
