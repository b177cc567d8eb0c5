//! Project bootstrap: the `init` operation that lays down an empty,
//! installable RuleStack project.

use std::path::Path;

use rulestack_lockfile::Lockfile;
use rulestack_manifest::ProjectManifest;
use tracing::instrument;

use crate::claude_md;
use crate::error::CoreError;
use crate::paths;

/// Initializes a fresh RuleStack project at `root`: writes `rulestack.json`,
/// `CLAUDE.md`, and `.rulestack/staged/`. Fails if `rulestack.json` already
/// exists -- `init` never overwrites an existing project.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn init_project(root: &Path, registry: Option<&str>) -> Result<(), CoreError> {
    let manifest_path = paths::project_manifest_path(root);
    if manifest_path.exists() {
        return Err(CoreError::AlreadyInitialized(root.display().to_string()));
    }

    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(paths::staged_dir(root))?;

    let manifest = ProjectManifest::new(".");
    rulestack_manifest::save_project_manifest(&manifest_path, &manifest)?;

    claude_md::ensure_claude_md(&paths::claude_md_path(root))?;

    if let Some(registry) = registry {
        let mut lockfile = Lockfile::load_or_create(&paths::lockfile_path(root))?;
        lockfile.registry = registry.to_string();
        lockfile.save(&paths::lockfile_path(root))?;
    }

    Ok(())
}
