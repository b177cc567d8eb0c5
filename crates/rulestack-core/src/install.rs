//! `add`: resolves a package spec against a registry, verifies its
//! integrity, extracts it, and records it in the project manifest, the
//! lockfile, and `CLAUDE.md`.

use std::path::Path;

use rulestack_archive::{calculate_sha256, unpack};
use rulestack_lockfile::{LockEntry, Lockfile};
use rulestack_manifest::{load_project_manifest, save_project_manifest};
use rulestack_registry::{CallContext, RegistryClient};
use tracing::instrument;
use walkdir::WalkDir;

use crate::error::CoreError;
use crate::paths;

/// A `name` or `name@version` spec as given on the command line.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('@') {
            // A leading `@` (scoped package, e.g. `@acme/x`) is not a version
            // separator -- only split on an `@` that isn't the first byte.
            Some((name, version)) if !name.is_empty() => Self {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            _ => Self {
                name: raw.to_string(),
                version: None,
            },
        }
    }
}

/// Outcome of a successful `add`.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub name: String,
    pub version: String,
    pub sha256: String,
    pub install_path: String,
    /// `true` if the package was already installed at this version and
    /// nothing was re-downloaded.
    pub already_installed: bool,
}

/// Installs `spec` from `client` into the project rooted at `root`: resolves
/// the version, verifies the downloaded archive's integrity, extracts it,
/// and records it in the project manifest, lockfile, and `CLAUDE.md`.
#[instrument(skip(client), fields(name = %spec.name))]
pub async fn add_package(
    root: &Path,
    client: &RegistryClient,
    spec: &PackageSpec,
    force: bool,
) -> Result<InstallOutcome, CoreError> {
    let ctx = CallContext::default();

    // Steps 2-3: resolve the version and its advertised sha256.
    let version = match &spec.version {
        Some(v) => v.clone(),
        None => client.get_package(&ctx, &spec.name).await?.latest_version,
    };
    let package_version = client.get_package_version(&ctx, &spec.name, &version).await?;

    let lockfile_path = paths::lockfile_path(root);
    let mut lockfile = Lockfile::load_or_create(&lockfile_path)?;
    let key = Lockfile::package_key(&spec.name, &version);

    // Step 4: idempotent re-install unless --force.
    if !force {
        if let Some(entry) = lockfile.get_package(&key) {
            if entry.version == version {
                return Ok(InstallOutcome {
                    name: spec.name.clone(),
                    version,
                    sha256: entry.sha256.clone(),
                    install_path: entry.install_path.clone(),
                    already_installed: true,
                });
            }
        }
    }

    // Step 5: download to a content-addressed cache file, then re-hash.
    let cache_path = paths::download_cache_path(root, &package_version.sha256);
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    client.download_blob(&ctx, &package_version.sha256, &cache_path).await?;
    let actual_sha256 = calculate_sha256(&cache_path)?;
    if actual_sha256 != package_version.sha256 {
        let _ = std::fs::remove_file(&cache_path);
        return Err(CoreError::IntegrityMismatch {
            name: spec.name.clone(),
            version,
            expected: package_version.sha256,
            actual: actual_sha256,
        });
    }

    // Step 6: extract (validated).
    let dest_dir = paths::install_dir(root, &spec.name, &version);
    unpack(&cache_path, &dest_dir)?;

    // Step 7: project manifest dependency entry.
    let manifest_path = paths::project_manifest_path(root);
    let mut project = load_project_manifest(&manifest_path)?;
    project.set_dependency(spec.name.clone(), version.clone());
    save_project_manifest(&manifest_path, &project)?;

    // Step 8: lockfile entry.
    let install_path = paths::relative_install_path(&spec.name, &version);
    lockfile.add_package(
        key,
        LockEntry {
            version: version.clone(),
            sha256: package_version.sha256.clone(),
            targets: package_version.targets.clone(),
            install_path: install_path.clone(),
            registry: None,
        },
    );
    lockfile.save(&lockfile_path)?;

    // Step 9: rule-reference index.
    let rel_paths = rule_files_relative_to(&dest_dir);
    crate::claude_md::append_references(&paths::claude_md_path(root), &install_path, &rel_paths)?;

    Ok(InstallOutcome {
        name: spec.name.clone(),
        version,
        sha256: package_version.sha256,
        install_path,
        already_installed: false,
    })
}

/// Every file under `dir` except `rulestack.json`, as forward-slashed paths
/// relative to `dir`.
fn rule_files_relative_to(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        if rel.file_name().and_then(|n| n.to_str()) == Some("rulestack.json") {
            continue;
        }
        let components: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(components.join("/"));
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_name() {
        let spec = PackageSpec::parse("demo");
        assert_eq!(spec.name, "demo");
        assert!(spec.version.is_none());
    }

    #[test]
    fn parses_name_at_version() {
        let spec = PackageSpec::parse("demo@1.2.3");
        assert_eq!(spec.name, "demo");
        assert_eq!(spec.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn scoped_name_without_version_is_not_split_on_leading_at() {
        let spec = PackageSpec::parse("@acme/demo");
        assert_eq!(spec.name, "@acme/demo");
        assert!(spec.version.is_none());
    }

    #[test]
    fn scoped_name_with_version_splits_on_the_last_at() {
        let spec = PackageSpec::parse("@acme/demo@1.0.0");
        assert_eq!(spec.name, "@acme/demo");
        assert_eq!(spec.version.as_deref(), Some("1.0.0"));
    }
}
