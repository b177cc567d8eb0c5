use clap_complete::Shell;

/// Generate shell autocompletions.
#[derive(clap::Parser, Debug)]
pub struct Completions {
    /// Shell to generate completions for.
    #[arg(default_value = "bash")]
    pub shell: Shell,
}
