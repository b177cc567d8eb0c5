use std::path::PathBuf;

use super::{OutputArgs, RegistryArgs};

/// Install a package into the current project.
#[derive(clap::Parser, Debug)]
pub struct Add {
    /// Path to the project root. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Package to install, as `name` or `name@version`.
    pub spec: String,

    /// Reinstall even if the lockfile already has this exact version.
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
