use anyhow::Context;
use rulestack_registry::CallContext;

use crate::args::{Info, OutputType};

pub async fn run(args: &Info) -> anyhow::Result<()> {
    let client = args.registry.client().context("failed to set up registry client")?;
    let ctx = CallContext::default();

    match &args.version {
        Some(version) => {
            let package_version = client
                .get_package_version(&ctx, &args.name, version)
                .await
                .context("failed to fetch package version")?;
            match args.output.output {
                Some(OutputType::Json) => crate::args::print_output(OutputType::Json, &package_version),
                None => {
                    println!("{}@{}", package_version.name, package_version.version);
                    if let Some(description) = &package_version.description {
                        println!("{description}");
                    }
                    println!("sha256: {}", package_version.sha256);
                    println!("size: {} bytes", package_version.size);
                    if !package_version.targets.is_empty() {
                        println!("targets: {:?}", package_version.targets);
                    }
                    if let Some(published_at) = &package_version.published_at {
                        println!("published: {published_at}");
                    }
                }
            }
        }
        None => {
            let package = client
                .get_package(&ctx, &args.name)
                .await
                .context("failed to fetch package")?;
            match args.output.output {
                Some(OutputType::Json) => crate::args::print_output(OutputType::Json, &package),
                None => {
                    println!("{}", package.name);
                    if let Some(description) = &package.description {
                        println!("{description}");
                    }
                    println!("latest: {}", package.latest_version);
                    if !package.versions.is_empty() {
                        println!("versions: {}", package.versions.join(", "));
                    }
                    if !package.tags.is_empty() {
                        println!("tags: {}", package.tags.join(", "));
                    }
                    if let Some(updated_at) = &package.updated_at {
                        println!("updated: {updated_at}");
                    }
                }
            }
        }
    }
    Ok(())
}
