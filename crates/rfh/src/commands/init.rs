use anyhow::Context;

use crate::args::Init;

pub fn run(args: &Init) -> anyhow::Result<()> {
    rulestack_core::init_project(&args.path, args.registry.as_deref())
        .context("failed to initialize RuleStack project")?;
    println!("initialized RuleStack project at {}", args.path.display());
    Ok(())
}
