use std::path::PathBuf;

/// Initialize a RuleStack project.
#[derive(clap::Parser, Debug)]
pub struct Init {
    /// Directory to initialize. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Registry URL to record in the fresh lockfile.
    #[arg(long)]
    pub registry: Option<String>,
}
