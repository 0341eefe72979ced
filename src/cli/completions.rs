use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    cognit completions --shell bash > ~/.bash_completion.d/cognit\n\n\
                  Generate zsh completions:\n    cognit completions --shell zsh > ~/.zfunc/_cognit\n\n\
                  Generate fish completions:\n    cognit completions --shell fish > ~/.config/fish/completions/cognit.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, short = 's', value_enum)]
    pub shell: Shell,
}
