//! The on-disk project layout from the RuleStack spec, centralized so every
//! other module in this crate builds paths the same way instead of
//! hand-joining strings.

use std::path::{Path, PathBuf};

pub const PROJECT_MANIFEST_FILE: &str = "rulestack.json";
pub const LOCKFILE_FILE: &str = "rulestack.lock.json";
pub const CLAUDE_MD_FILE: &str = "CLAUDE.md";
pub const RULESTACK_DIR: &str = ".rulestack";
pub const STAGED_DIR: &str = "staged";
pub const CACHE_DIR: &str = ".cache";

#[must_use]
pub fn project_manifest_path(root: &Path) -> PathBuf {
    root.join(PROJECT_MANIFEST_FILE)
}

#[must_use]
pub fn lockfile_path(root: &Path) -> PathBuf {
    root.join(LOCKFILE_FILE)
}

#[must_use]
pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD_FILE)
}

#[must_use]
pub fn rulestack_dir(root: &Path) -> PathBuf {
    root.join(RULESTACK_DIR)
}

#[must_use]
pub fn staged_dir(root: &Path) -> PathBuf {
    rulestack_dir(root).join(STAGED_DIR)
}

#[must_use]
pub fn staged_archive_path(root: &Path, name: &str, version: &str) -> PathBuf {
    staged_dir(root).join(format!("{name}-{version}.tgz"))
}

#[must_use]
pub fn download_cache_path(root: &Path, sha256: &str) -> PathBuf {
    rulestack_dir(root).join(CACHE_DIR).join(format!("{sha256}.tgz"))
}

/// `.rulestack/<name>.<version>/` — content-addressed by name and version,
/// not by hash, so a plain `ls .rulestack` is legible to a human.
#[must_use]
pub fn install_dir(root: &Path, name: &str, version: &str) -> PathBuf {
    rulestack_dir(root).join(format!("{name}.{version}"))
}

/// The `.rulestack/<name>.<version>` path as it is recorded in the lockfile
/// and in `CLAUDE.md` references -- always forward-slashed, relative to the
/// project root.
#[must_use]
pub fn relative_install_path(name: &str, version: &str) -> String {
    format!("{RULESTACK_DIR}/{name}.{version}")
}
