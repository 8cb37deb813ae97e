//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;

pub mod batch;
pub mod completions;
pub mod search;
pub mod similar;
pub mod suggest;

/// Dispatch a command to its handler. `completions` never reaches here; it
/// runs before a context is built.
pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args).await,
        Commands::Similar(args) => similar::run(ctx, args).await,
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::Batch(args) => batch::run(ctx, args).await,
        Commands::Completions(args) => completions::run(args),
    }
}

/// Write `data` as a robot envelope, or hand it to `human` for terminal
/// output. Quiet mode suppresses human output only.
pub(crate) fn render<T, F>(ctx: &AppContext, data: &T, warnings: Vec<String>, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if ctx.robot_mode {
        return emit_json(&robot_ok(data).with_warnings(warnings));
    }
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    if !ctx.quiet {
        print!("{}", human(data));
    }
    Ok(())
}
