//! Cognit - local installation store for AI agent cognitives
//!
//! Installs skills, agents, prompts and rules once into a canonical store and
//! links them into every coding tool that should see them.

use std::process::ExitCode;

use clap::Parser;
use console::Style;
use miette::Diagnostic;

use cognit::cli::Cli;
use cognit::env::ProcessEnv;
use cognit::{commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&ProcessEnv, cli.verbose) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match commands::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", Style::new().red().bold().apply_to("Error:"));
            if let Some(help) = e.help() {
                eprintln!("  {} {help}", Style::new().cyan().apply_to("help:"));
            }
            ExitCode::FAILURE
        }
    }
}
