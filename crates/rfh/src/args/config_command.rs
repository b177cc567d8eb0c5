use std::path::PathBuf;

use super::OutputArgs;

/// List the registries configured in `rfh.toml`.
#[derive(clap::Parser, Debug)]
pub struct ConfigList {
    /// Path to the `rfh.toml` configuration file.
    #[arg(long, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Select the registry used by default when `--registry` is omitted.
#[derive(clap::Parser, Debug)]
pub struct ConfigUse {
    /// Name of the registry to select, as configured in `rfh.toml`.
    pub name: String,

    /// Path to the `rfh.toml` configuration file.
    #[arg(long, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,
}
