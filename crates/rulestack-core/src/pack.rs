//! `pack`: turns a single rule file into a staged, publishable archive,
//! either as a brand-new package (spec branch A) or as an additive update
//! carrying forward every rule file from the previously installed version
//! (spec branch B).

use std::path::{Path, PathBuf};

use rulestack_archive::pack_from_directory;
use rulestack_manifest::{load_project_manifest, save_single_package_manifest, PackageManifest};
use tracing::instrument;

use crate::error::CoreError;
use crate::paths;

/// Result of a successful pack: where the archive landed and the manifest
/// that was packed alongside it.
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub archive_path: PathBuf,
    pub install_dir: PathBuf,
    pub manifest: PackageManifest,
}

/// Packs `file` into `package`, choosing branch A (new package) or branch B
/// (additive update) by probing the project manifest's `dependencies` map
/// and the on-disk install directory for `package`'s current version.
#[instrument(skip_all, fields(package, version))]
pub fn pack(
    root: &Path,
    file: &Path,
    package: &str,
    version: Option<&str>,
) -> Result<PackOutcome, CoreError> {
    require_mdc(file)?;

    let manifest_path = paths::project_manifest_path(root);
    if !manifest_path.exists() {
        return Err(CoreError::NotAProjectWorkspace(root.display().to_string()));
    }
    let project = load_project_manifest(&manifest_path)?;

    match project.dependencies.get(package) {
        Some(current) => pack_additive(root, file, package, current, version),
        None => pack_new(root, file, package, version.unwrap_or("1.0.0")),
    }
}

fn require_mdc(file: &Path) -> Result<(), CoreError> {
    let is_mdc = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mdc"));
    if is_mdc {
        Ok(())
    } else {
        Err(CoreError::NotAnMdcFile(file.display().to_string()))
    }
}

fn pack_new(root: &Path, file: &Path, package: &str, version: &str) -> Result<PackOutcome, CoreError> {
    check_version(version)?;

    let dir = paths::install_dir(root, package, version);
    build_package(root, &dir, package, version, file, &[])
}

fn check_version(version: &str) -> Result<(), CoreError> {
    rulestack_semver::parse_version(version)
        .map(|_| ())
        .map_err(|_| rulestack_manifest::ManifestError::InvalidVersion(version.to_string()).into())
}

fn pack_additive(
    root: &Path,
    file: &Path,
    package: &str,
    current: &str,
    version: Option<&str>,
) -> Result<PackOutcome, CoreError> {
    let old_dir = paths::install_dir(root, package, current);
    if !old_dir.is_dir() {
        return Err(CoreError::PackageNotInstalled(package.to_string()));
    }

    check_version(current)?;
    let current_version = rulestack_semver::parse_version(current)
        .map_err(|_| rulestack_manifest::ManifestError::InvalidVersion(current.to_string()))?;
    let new_version = match version {
        Some(v) => {
            check_version(v)?;
            rulestack_semver::parse_version(v)
                .map_err(|_| rulestack_manifest::ManifestError::InvalidVersion(v.to_string()))?
        }
        None => rulestack_semver::increment_patch(&current_version),
    };
    rulestack_semver::validate_version_increase(&current_version, &new_version).map_err(|_| {
        CoreError::VersionNotIncreasing {
            name: package.to_string(),
            current: current.to_string(),
            new: new_version.to_string(),
        }
    })?;

    let existing_files = prior_rule_files(&old_dir)?;
    let new_filename = file
        .file_name()
        .ok_or_else(|| CoreError::NotAnMdcFile(file.display().to_string()))?
        .to_string_lossy()
        .into_owned();
    if existing_files.contains(&new_filename) {
        return Err(CoreError::FileNameCollision(new_filename));
    }

    let new_dir = paths::install_dir(root, package, &new_version.to_string());
    let carry_forward: Vec<PathBuf> = existing_files.iter().map(|f| old_dir.join(f)).collect();
    build_package(root, &new_dir, package, &new_version.to_string(), file, &carry_forward)
}

/// Every `.mdc` file directly inside `dir`, excluding `rulestack.json`.
fn prior_rule_files(dir: &Path) -> Result<Vec<String>, CoreError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != "rulestack.json" && name.ends_with(".mdc") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Creates `dir`, copies `carry_forward` files and `new_file` into it,
/// writes the package manifest, and packs the result into the staged
/// archive directory. Removes `dir` on any failure after creation so a
/// failed pack never leaves a half-built install directory behind.
fn build_package(
    root: &Path,
    dir: &Path,
    package: &str,
    version: &str,
    new_file: &Path,
    carry_forward: &[PathBuf],
) -> Result<PackOutcome, CoreError> {
    match build_package_inner(root, dir, package, version, new_file, carry_forward) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            let _ = std::fs::remove_dir_all(dir);
            Err(err)
        }
    }
}

fn build_package_inner(
    root: &Path,
    dir: &Path,
    package: &str,
    version: &str,
    new_file: &Path,
    carry_forward: &[PathBuf],
) -> Result<PackOutcome, CoreError> {
    std::fs::create_dir_all(dir)?;

    let mut files = Vec::new();
    for prior in carry_forward {
        let name = prior
            .file_name()
            .ok_or_else(|| CoreError::NotAnMdcFile(prior.display().to_string()))?;
        std::fs::copy(prior, dir.join(name))?;
        files.push(name.to_string_lossy().into_owned());
    }

    let new_name = new_file
        .file_name()
        .ok_or_else(|| CoreError::NotAnMdcFile(new_file.display().to_string()))?;
    std::fs::copy(new_file, dir.join(new_name))?;
    files.push(new_name.to_string_lossy().into_owned());
    files.sort();

    let manifest = PackageManifest {
        name: package.to_string(),
        version: version.to_string(),
        description: None,
        targets: Vec::new(),
        tags: Vec::new(),
        files,
        license: None,
    };
    save_single_package_manifest(&dir.join("rulestack.json"), &manifest)?;

    std::fs::create_dir_all(paths::staged_dir(root))?;
    let archive_path = paths::staged_archive_path(root, package, version);
    pack_from_directory(dir, &archive_path)?;

    Ok(PackOutcome {
        archive_path,
        install_dir: dir.to_path_buf(),
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_project;
    use rulestack_manifest::{load_project_manifest, save_project_manifest};

    fn setup_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path(), None).unwrap();
        dir
    }

    fn write_rule(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn packs_new_package_with_default_version() {
        let project = setup_project();
        let rule = write_rule(project.path(), "a.mdc", "rule a");

        let outcome = pack(project.path(), &rule, "demo", None).unwrap();
        assert_eq!(outcome.manifest.version, "1.0.0");
        assert_eq!(outcome.manifest.files, vec!["a.mdc".to_string()]);
        assert!(outcome.archive_path.exists());
        assert!(outcome.install_dir.join("a.mdc").exists());
    }

    #[test]
    fn rejects_non_mdc_file() {
        let project = setup_project();
        let rule = write_rule(project.path(), "a.txt", "not a rule");
        let err = pack(project.path(), &rule, "demo", None).unwrap_err();
        assert!(matches!(err, CoreError::NotAnMdcFile(_)));
    }

    #[test]
    fn additive_update_carries_forward_prior_files_and_bumps_patch() {
        let project = setup_project();
        let rule = write_rule(project.path(), "auth.mdc", "rule auth");
        pack(project.path(), &rule, "security", Some("1.0.0")).unwrap();

        // Simulate "installed": record the dependency in the project manifest.
        let manifest_path = paths::project_manifest_path(project.path());
        let mut manifest = load_project_manifest(&manifest_path).unwrap();
        manifest.set_dependency("security", "1.0.0");
        save_project_manifest(&manifest_path, &manifest).unwrap();

        let new_rule = write_rule(project.path(), "new.mdc", "rule new");
        let outcome = pack(project.path(), &new_rule, "security", None).unwrap();

        assert_eq!(outcome.manifest.version, "1.0.1");
        assert_eq!(
            outcome.manifest.files,
            vec!["auth.mdc".to_string(), "new.mdc".to_string()]
        );
        assert!(outcome.install_dir.join("auth.mdc").exists());
        assert!(outcome.install_dir.join("new.mdc").exists());
    }

    #[test]
    fn rejects_version_decrease_and_creates_nothing() {
        let project = setup_project();
        let rule = write_rule(project.path(), "x.mdc", "rule x");
        pack(project.path(), &rule, "security", Some("1.5.0")).unwrap();

        let manifest_path = paths::project_manifest_path(project.path());
        let mut manifest = load_project_manifest(&manifest_path).unwrap();
        manifest.set_dependency("security", "1.5.0");
        save_project_manifest(&manifest_path, &manifest).unwrap();

        let new_rule = write_rule(project.path(), "y.mdc", "rule y");
        let err = pack(project.path(), &new_rule, "security", Some("1.2.0")).unwrap_err();
        assert!(matches!(err, CoreError::VersionNotIncreasing { .. }));
        assert!(!paths::install_dir(project.path(), "security", "1.2.0").exists());
    }

    #[test]
    fn rejects_filename_collision_with_an_installed_rule_file() {
        let project = setup_project();
        let rule = write_rule(project.path(), "auth.mdc", "rule auth");
        pack(project.path(), &rule, "security", Some("1.0.0")).unwrap();

        let manifest_path = paths::project_manifest_path(project.path());
        let mut manifest = load_project_manifest(&manifest_path).unwrap();
        manifest.set_dependency("security", "1.0.0");
        save_project_manifest(&manifest_path, &manifest).unwrap();

        let staging = tempfile::tempdir().unwrap();
        let conflict_path = write_rule(staging.path(), "auth.mdc", "a different rule body");

        let err = pack(project.path(), &conflict_path, "security", None).unwrap_err();
        assert!(matches!(err, CoreError::FileNameCollision(_)));
    }
}
