mod args;
mod commands;
mod config;
mod log;

use args::{CliArgs, Command};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    log::init(args.verbosity()?);
    run(args).await.map_err(|e| {
        error!("{e:?}");
        e
    })?;
    Ok(())
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Command::Init(cmd_args) => commands::init::run(&cmd_args)?,
        Command::Pack(cmd_args) => commands::pack::run(&cmd_args)?,
        Command::Publish(cmd_args) => commands::publish::run(&cmd_args).await?,
        Command::Search(cmd_args) => commands::search::run(&cmd_args).await?,
        Command::Add(cmd_args) => commands::add::run(&cmd_args).await?,
        Command::Info(cmd_args) => commands::info::run(&cmd_args).await?,
        Command::ConfigList(cmd_args) => commands::config::list(&cmd_args)?,
        Command::ConfigUse(cmd_args) => commands::config::use_registry(&cmd_args)?,
        Command::Completions(cmd_args) => commands::completions::run(&cmd_args),
    }
    Ok(())
}
