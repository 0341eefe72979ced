use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List installed cognitives:\n    cognit list\n\n\
                  Show store paths and hashes:\n    cognit list --detailed\n\n\
                  List configured platforms:\n    cognit list --platforms")]
pub struct ListArgs {
    /// Show detailed output
    #[arg(long)]
    pub detailed: bool,

    /// List the configured platforms instead
    #[arg(long, conflicts_with = "detailed")]
    pub platforms: bool,
}
