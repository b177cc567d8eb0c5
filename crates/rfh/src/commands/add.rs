use anyhow::Context;

use crate::args::{Add, OutputType};

pub async fn run(args: &Add) -> anyhow::Result<()> {
    let client = args.registry.client().context("failed to set up registry client")?;
    let spec = rulestack_core::PackageSpec::parse(&args.spec);
    let outcome = rulestack_core::add_package(&args.path, &client, &spec, args.force)
        .await
        .context("failed to install package")?;

    match args.output.output {
        Some(OutputType::Json) => crate::args::print_output(OutputType::Json, SerializableOutcome::from(&outcome)),
        None => {
            if outcome.already_installed {
                println!("{}@{} is already installed, skipping", outcome.name, outcome.version);
            } else {
                println!(
                    "installed {}@{} at {}",
                    outcome.name, outcome.version, outcome.install_path
                );
            }
        }
    }
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct SerializableOutcome<'a> {
    name: &'a str,
    version: &'a str,
    sha256: &'a str,
    install_path: &'a str,
    already_installed: bool,
}

impl<'a> From<&'a rulestack_core::InstallOutcome> for SerializableOutcome<'a> {
    fn from(outcome: &'a rulestack_core::InstallOutcome) -> Self {
        Self {
            name: &outcome.name,
            version: &outcome.version,
            sha256: &outcome.sha256,
            install_path: &outcome.install_path,
            already_installed: outcome.already_installed,
        }
    }
}
