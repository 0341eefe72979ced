use std::path::PathBuf;

use clap::Parser;

use crate::domain::CognitiveType;

/// Arguments for the add command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install a skill for Claude Code:\n    cognit add ./review --to claude-code\n\n\
                  Install for several tools:\n    cognit add ./review --to claude-code --to cursor\n\n\
                  Install a rule globally under a category:\n    cognit add ./style --type rule --category team -g\n\n\
                  Copy instead of symlinking:\n    cognit add ./review --copy\n\n\
                  Install from a git repository:\n    cognit add https://github.com/acme/skills.git --subdir review --ref v1")]
pub struct AddArgs {
    /// Directory holding the cognitive, or a git URL
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Branch, tag or commit to check out (git sources)
    #[arg(long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Directory of the cognitive inside the repository (git sources)
    #[arg(long)]
    pub subdir: Option<PathBuf>,

    /// Name to install under (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Cognitive type: skill, agent, prompt or rule (detected from SKILL.md, AGENT.md, ... when omitted)
    #[arg(long = "type", short = 't')]
    pub cognitive_type: Option<CognitiveType>,

    /// Store category (defaults to the configured default category)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Platform to install for; repeatable (defaults to the last selection, else universal)
    #[arg(long = "to", value_name = "PLATFORM")]
    pub to: Vec<String>,

    /// Copy into platform directories instead of symlinking
    #[arg(long)]
    pub copy: bool,
}
