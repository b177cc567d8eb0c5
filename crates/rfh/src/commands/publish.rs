use anyhow::{bail, Context};
use rulestack_registry::CallContext;
use serde::Serialize;

use crate::args::{OutputType, Publish};

#[derive(Debug, Serialize)]
struct PublishOutput {
    package: String,
    version: String,
    message: String,
    pr_url: Option<String>,
}

pub async fn run(args: &Publish) -> anyhow::Result<()> {
    let (archive_path, manifest_path, version) = match &args.file {
        Some(file) => {
            let outcome =
                rulestack_core::pack(&args.path, file, &args.package, args.version.as_deref())
                    .context("failed to pack package before publishing")?;
            let manifest_path = outcome.install_dir.join("rulestack.json");
            (outcome.archive_path, manifest_path, outcome.manifest.version)
        }
        None => {
            let version = args
                .version
                .as_deref()
                .context("--version is required when publishing an already-staged package without --file")?
                .to_string();
            let archive_path =
                rulestack_core::paths::staged_archive_path(&args.path, &args.package, &version);
            let install_dir = rulestack_core::paths::install_dir(&args.path, &args.package, &version);
            let manifest_path = install_dir.join("rulestack.json");
            if !archive_path.exists() {
                bail!(
                    "no staged archive found at {}; pack the package first or pass --file",
                    archive_path.display()
                );
            }
            (archive_path, manifest_path, version)
        }
    };

    let client = args.registry.client().context("failed to set up registry client")?;
    let ctx = CallContext::default();
    let result = client
        .publish_package(&ctx, &manifest_path, &archive_path)
        .await
        .context("failed to publish package")?;

    let output = PublishOutput {
        package: args.package.clone(),
        version,
        message: result.message,
        pr_url: result.pr_url,
    };

    match args.output.output {
        Some(OutputType::Json) => crate::args::print_output(OutputType::Json, &output),
        None => {
            println!("published {}@{}: {}", output.package, output.version, output.message);
            if let Some(pr_url) = &output.pr_url {
                println!("pull request: {pr_url}");
            }
        }
    }
    Ok(())
}
