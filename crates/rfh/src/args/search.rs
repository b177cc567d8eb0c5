use super::{OutputArgs, RegistryArgs};

/// Search a registry for packages.
#[derive(clap::Parser, Debug)]
pub struct Search {
    /// Free-text query, matched against package name and description.
    pub query: Option<String>,

    /// Only return packages tagged with this value.
    #[arg(long)]
    pub tag: Option<String>,

    /// Only return packages that support this editor target.
    #[arg(long)]
    pub target: Option<String>,

    /// Maximum number of results to return.
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
