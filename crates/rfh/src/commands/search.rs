use anyhow::Context;
use rulestack_registry::{CallContext, SearchQuery};

use crate::args::{OutputType, Search};

pub async fn run(args: &Search) -> anyhow::Result<()> {
    let client = args.registry.client().context("failed to set up registry client")?;
    let ctx = CallContext::default();
    let query = SearchQuery {
        query: args.query.clone(),
        tag: args.tag.clone(),
        target: args.target.clone(),
        limit: args.limit,
    };
    let packages = client
        .search_packages(&ctx, &query)
        .await
        .context("failed to search registry")?;

    match args.output.output {
        Some(OutputType::Json) => crate::args::print_output(OutputType::Json, &packages),
        None => {
            if packages.is_empty() {
                println!("no packages found");
            }
            for package in &packages {
                let description = package.description.as_deref().unwrap_or("");
                println!("{} {}  {description}", package.name, package.latest_version);
            }
        }
    }
    Ok(())
}
