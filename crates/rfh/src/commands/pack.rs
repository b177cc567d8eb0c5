use anyhow::Context;

use crate::args::Pack;

pub fn run(args: &Pack) -> anyhow::Result<()> {
    let outcome = rulestack_core::pack(&args.path, &args.file, &args.package, args.version.as_deref())
        .context("failed to pack package")?;
    println!(
        "packed {}@{} -> {}",
        outcome.manifest.name,
        outcome.manifest.version,
        outcome.archive_path.display()
    );
    Ok(())
}
