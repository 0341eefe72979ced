//! Shell completions command

use std::io::Write;

use clap::CommandFactory;

use crate::cli::CompletionsArgs;
use crate::error::Result;

/// Generate shell completions
pub fn run(args: &CompletionsArgs) -> Result<()> {
    write_completions(args, &mut std::io::stdout().lock())
}

fn write_completions(args: &CompletionsArgs, out: &mut dyn Write) -> Result<()> {
    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(args.shell, &mut cmd, "cognit", out);
    out.flush()?;
    Ok(())
}
