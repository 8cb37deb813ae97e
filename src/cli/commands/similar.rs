//! csearch similar - Creators closest to a reference creator

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::render;
use crate::cli::formatters::SearchResults;
use crate::error::{Result, SearchError};
use crate::search::ResultItem;

#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Reference creator id
    pub creator_id: String,

    /// Number of similar creators to return
    #[arg(long, short = 'n', default_value = "5")]
    pub count: usize,
}

#[derive(Serialize)]
struct SimilarOutput<'a> {
    creator_id: &'a str,
    similar_creators: Vec<ResultItem>,
}

pub async fn run(ctx: &AppContext, args: &SimilarArgs) -> Result<()> {
    if ctx.corpus.get(&args.creator_id).is_none() {
        return Err(SearchError::InvalidRequest(format!(
            "unknown creator id: {}",
            args.creator_id
        )));
    }

    let similar = ctx
        .engine
        .similar_creators(&args.creator_id, &ctx.corpus, args.count)
        .await;
    let output = SimilarOutput {
        creator_id: &args.creator_id,
        similar_creators: similar,
    };
    render(ctx, &output, Vec::new(), |output| {
        SearchResults::listing(
            &format!("Creators similar to {}", output.creator_id),
            &output.similar_creators,
        )
    })
}
