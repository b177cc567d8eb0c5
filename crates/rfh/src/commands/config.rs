use anyhow::Context;

use crate::args::{ConfigList, ConfigUse, OutputType};
use crate::config::RfhConfig;

pub fn list(args: &ConfigList) -> anyhow::Result<()> {
    let config = RfhConfig::load(&args.config).context("failed to load rfh.toml")?;

    match args.output.output {
        Some(OutputType::Json) => crate::args::print_output(OutputType::Json, &config),
        None => {
            if config.registries.is_empty() {
                println!("no registries configured in {}", args.config.display());
                return Ok(());
            }
            for (name, entry) in &config.registries {
                let marker = if config.current.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}  {}", entry.url);
            }
        }
    }
    Ok(())
}

pub fn use_registry(args: &ConfigUse) -> anyhow::Result<()> {
    RfhConfig::use_registry(&args.config, &args.name)
        .with_context(|| format!("failed to select registry '{}'", args.name))?;
    println!("now using registry '{}'", args.name);
    Ok(())
}
