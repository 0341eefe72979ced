use clap::Parser;

/// Arguments for the check command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Verify the project store:\n    cognit check\n\n\
                  Verify the global store as JSON:\n    cognit check -g --json")]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show what would be repaired:\n    cognit sync --dry-run\n\n\
                  Repair without confirmation:\n    cognit sync --yes")]
pub struct SyncArgs {
    /// Report issues without repairing them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y', conflicts_with = "dry_run")]
    pub yes: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::super::{Cli, Commands};

    #[test]
    fn test_cli_parsing_sync() {
        let cli = Cli::try_parse_from(["cognit", "sync", "-y"]).unwrap();
        match cli.command {
            Commands::Sync(args) => {
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_cli_parsing_sync_dry_run_conflicts_with_yes() {
        assert!(Cli::try_parse_from(["cognit", "sync", "--dry-run", "--yes"]).is_err());
    }

    #[test]
    fn test_cli_parsing_check_json() {
        let cli = Cli::try_parse_from(["cognit", "check", "--json"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert!(args.json),
            _ => panic!("Expected Check command"),
        }
    }
}
