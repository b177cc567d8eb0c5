use super::{OutputArgs, RegistryArgs};

/// Show details about a package, or one of its versions.
#[derive(clap::Parser, Debug)]
pub struct Info {
    /// Package name.
    pub name: String,

    /// Specific version to show. Defaults to the latest version's summary.
    pub version: Option<String>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
