use std::path::PathBuf;

use super::{OutputArgs, RegistryArgs};

/// Publish a package to a registry.
///
/// If `--file` is given, packs it first; otherwise reuses the archive
/// already staged under `.rulestack/staged/` by a previous `rfh pack`.
#[derive(clap::Parser, Debug)]
pub struct Publish {
    /// Path to the project root. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Name of the package to publish.
    #[arg(long)]
    pub package: String,

    /// Version to publish. Required when `--file` is given and the package
    /// is new; otherwise defaults to the version already staged.
    #[arg(long)]
    pub version: Option<String>,

    /// Rule file to pack before publishing, when not already staged.
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
