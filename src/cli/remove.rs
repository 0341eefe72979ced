use clap::Parser;

/// Arguments for the remove command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Remove a cognitive everywhere:\n    cognit remove review\n\n\
                  Remove only the Cursor link, keep the store copy:\n    cognit remove review --from cursor")]
pub struct RemoveArgs {
    /// Name of the installed cognitive
    pub name: String,

    /// Only unlink from these platforms; the store copy and lock entry stay
    #[arg(long = "from", value_name = "PLATFORM")]
    pub from: Vec<String>,
}
