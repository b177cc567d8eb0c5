use std::path::PathBuf;

/// Pack a `.mdc` rule file into a publishable package.
#[derive(clap::Parser, Debug)]
pub struct Pack {
    /// Path to the project root. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// The rule file to pack.
    #[arg(long)]
    pub file: PathBuf,

    /// Name of the package.
    #[arg(long)]
    pub package: String,

    /// Version to pack. For a new package, defaults to `1.0.0`; for an
    /// additive update, defaults to the current version with its patch
    /// component incremented.
    #[arg(long)]
    pub version: Option<String>,
}
