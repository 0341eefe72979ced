use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    cognit cache\n\n\
                  Clear cached clones and fetches:\n    cognit cache clear")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSubcommand {
    /// Show cache statistics
    Stats,

    /// Remove every cached clone and fetch
    Clear,
}
