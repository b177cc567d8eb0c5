mod add;
mod completions;
mod config_command;
mod info;
mod init;
mod pack;
mod publish;
mod search;

pub use add::Add;
pub use completions::Completions;
pub use config_command::{ConfigList, ConfigUse};
pub use info::Info;
pub use init::Init;
pub use pack::Pack;
pub use publish::Publish;
pub use search::Search;

use std::path::PathBuf;

use clap::builder::{Styles, styling::AnsiColor};
use tracing::level_filters::LevelFilter;

use crate::config::RfhConfig;

const MAIN_COLOR: AnsiColor = AnsiColor::Red;
const SECONDARY_COLOR: AnsiColor = AnsiColor::Yellow;
const HELP_STYLES: Styles = Styles::styled()
    .header(MAIN_COLOR.on_default().bold())
    .usage(MAIN_COLOR.on_default().bold())
    .placeholder(SECONDARY_COLOR.on_default())
    .literal(SECONDARY_COLOR.on_default());

/// rfh manages RuleStack packages: versioned bundles of AI coding-assistant
/// rule files, packed, published, and installed like a small registry client.
///
/// See the RuleStack specification for more information.
#[derive(clap::Parser, Debug)]
#[command(version, author, styles = HELP_STYLES)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Print source location and additional information in logs.
    ///
    /// If this option is unspecified, logs are printed at the INFO level without verbosity.
    /// `-v` adds verbosity to logs.
    /// `-vv` adds verbosity and sets the log level to DEBUG.
    /// `-vvv` adds verbosity and sets the log level to TRACE.
    /// To change the log level without setting verbosity, use the `RFH_LOG`
    /// environment variable. E.g. `RFH_LOG=debug`.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl CliArgs {
    pub fn verbosity(&self) -> anyhow::Result<Option<LevelFilter>> {
        let level = match self.verbose {
            0 => None,
            1 => Some(LevelFilter::INFO),
            2 => Some(LevelFilter::DEBUG),
            3 => Some(LevelFilter::TRACE),
            _ => anyhow::bail!("invalid verbosity level. Use -v, -vv, or -vvv."),
        };
        Ok(level)
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Initialize a RuleStack project in the current directory.
    ///
    /// Writes `rulestack.json`, `CLAUDE.md`, and `.rulestack/staged/`. Refuses
    /// to run again once `rulestack.json` already exists.
    Init(Init),
    /// Pack a rule file into a publishable package.
    ///
    /// Packs a new package, or -- if `--package` is already a dependency of
    /// this project -- an additive update that carries forward every rule
    /// file from the currently installed version.
    Pack(Pack),
    /// Publish a packed archive to a registry.
    Publish(Publish),
    /// Search a registry for packages.
    Search(Search),
    /// Install a package (and record it as a project dependency).
    ///
    /// Specify a version with the syntax `<name>@<version>`; omit it to
    /// install the registry's latest version.
    Add(Add),
    /// Show details about a package and optionally one of its versions.
    Info(Info),
    /// List the registries configured in `rfh.toml`.
    ConfigList(ConfigList),
    /// Select the registry used by default when `--registry` is omitted.
    ConfigUse(ConfigUse),
    /// Generate shell autocompletions.
    Completions(Completions),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputType {
    Json,
}

/// Global `--output json` flag shared by the commands that have a structured
/// result worth emitting as JSON.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Print the result as JSON instead of a human-readable summary.
    #[arg(long = "output")]
    pub output: Option<OutputType>,
}

pub fn print_output(output_type: OutputType, value: impl serde::Serialize) {
    match output_type {
        OutputType::Json => match serde_json::to_string(&value) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("can't serialize output to json: {e}"),
        },
    }
}

/// Flags shared by every command that talks to a registry: which one
/// (`--registry`, falling back to `rfh.toml`'s `current`) and where its
/// config file lives (`--config`, defaulting to `./rfh.toml`).
#[derive(clap::Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Name of the registry to use, as configured in `rfh.toml`.
    ///
    /// Defaults to the `current` registry, or the sole configured one.
    #[arg(long)]
    pub registry: Option<String>,

    /// Path to the `rfh.toml` configuration file.
    #[arg(long, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,
}

impl RegistryArgs {
    pub fn resolve(&self) -> anyhow::Result<rulestack_registry::RegistryConfig> {
        let config = RfhConfig::load(&self.config)?;
        config.resolve(self.registry.as_deref())
    }

    pub fn client(&self) -> anyhow::Result<rulestack_registry::RegistryClient> {
        let registry_config = self.resolve()?;
        Ok(rulestack_registry::RegistryClient::from_config(&registry_config)?)
    }
}
