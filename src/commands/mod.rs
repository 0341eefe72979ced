//! Command implementations for the cognit CLI

pub mod add;
pub mod cache;
pub mod check;
pub mod completions;
pub mod context;
pub mod list;
pub mod remove;
pub mod sync;

use std::process::ExitCode;

use crate::cli::{Cli, Commands};
use crate::error::Result;

pub use context::Context;

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<ExitCode> {
    if let Commands::Completions(args) = &cli.command {
        completions::run(args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let ctx = Context::from_process(cli.project, cli.global)?;
    match cli.command {
        Commands::Add(args) => add::run(&ctx, args)?,
        Commands::Remove(args) => remove::run(&ctx, args)?,
        Commands::List(args) => list::run(&ctx, args)?,
        Commands::Check(args) => {
            if !check::run(&ctx, &args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Sync(args) => sync::run(&ctx, &args)?,
        Commands::Cache(args) => cache::run(&ctx, &args)?,
        Commands::Completions(_) => {}
    }
    Ok(ExitCode::SUCCESS)
}
