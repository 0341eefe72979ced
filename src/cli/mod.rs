//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - add: Add command arguments
//! - remove: Remove command arguments
//! - list: List command arguments
//! - sync: Check and sync command arguments
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod add;
pub mod cache;
pub mod completions;
pub mod list;
pub mod remove;
pub mod sync;

pub use add::AddArgs;
pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use list::ListArgs;
pub use remove::RemoveArgs;
pub use sync::{CheckArgs, SyncArgs};

/// Cognit - local store for AI agent cognitives
///
/// Install skills, agents, prompts and rules once and share them across coding tools.
#[derive(Parser, Debug)]
#[command(
    name = "cognit",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Local installation store for AI agent skills, agents, prompts and rules",
    long_about = "Cognit keeps one canonical copy of every installed cognitive, links it into each \
                  coding tool's directory (Claude Code, Cursor, Codex, ...) and records it in a lock \
                  file that can be checked and synced against the disk.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  cognit add ./skills/review --to claude-code  \x1b[90m# Install a local skill\x1b[0m\n   \
                  cognit add ./rules/style --type rule --copy  \x1b[90m# Copy instead of symlink\x1b[0m\n   \
                  cognit remove review                         \x1b[90m# Remove everywhere\x1b[0m\n   \
                  cognit check                                 \x1b[90m# Verify the store\x1b[0m\n   \
                  cognit sync --yes                            \x1b[90m# Repair drift\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to the nearest project root above the current directory)
    #[arg(long, short = 'p', global = true, env = "COGNIT_PROJECT")]
    pub project: Option<PathBuf>,

    /// Use the global store instead of the project store
    #[arg(long, short = 'g', global = true)]
    pub global: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a cognitive from a local directory
    Add(AddArgs),

    /// Remove an installed cognitive
    Remove(RemoveArgs),

    /// List installed cognitives
    List(ListArgs),

    /// Verify installed cognitives against the lock file
    Check(CheckArgs),

    /// Detect and repair drift between the lock file and the store
    Sync(SyncArgs),

    /// Manage the source cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
