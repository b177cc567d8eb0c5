use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ManifestError, NAME_RE};

/// Editor integrations that know how to read installed rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Cursor,
    ClaudeCode,
    Windsurf,
    Copilot,
}

impl Target {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::ClaudeCode => "claude-code",
            Self::Windsurf => "windsurf",
            Self::Copilot => "copilot",
        }
    }
}

/// Describes one publishable artifact: a named, versioned bundle of rule
/// files. This is the shape persisted both inside a packed archive and
/// inside `.rulestack/<name>.<version>/rulestack.json` once installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Glob patterns (doublestar semantics) describing which files belong to
    /// the package. Must be non-empty.
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl PackageManifest {
    pub fn validate(&self) -> Result<(), ManifestError> {
        if !NAME_RE.is_match(&self.name) {
            return Err(ManifestError::InvalidName(self.name.clone()));
        }
        if !rulestack_semver::is_valid_version(&self.version) {
            return Err(ManifestError::InvalidVersion(self.version.clone()));
        }
        if self.files.is_empty() {
            return Err(ManifestError::InvalidManifest {
                index: 0,
                reason: "files[] must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Either a bare array of package manifests, or (for back-compat with older
/// archives) a single manifest object.
#[derive(Deserialize)]
#[serde(untagged)]
enum PackageManifestsShape {
    Many(Vec<PackageManifest>),
    One(Box<PackageManifest>),
}

/// Load all package manifests from `path`.
///
/// Accepts either a JSON array of manifests, or a single manifest object
/// (older archives only ever contained one). Every entry is validated;
/// the first invalid entry fails with its index.
pub fn load_package_manifests(path: &Path) -> Result<Vec<PackageManifest>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let shape: PackageManifestsShape =
        serde_json::from_str(&content).map_err(|source| ManifestError::Json {
            path: path.display().to_string(),
            source,
        })?;
    let manifests = match shape {
        PackageManifestsShape::Many(m) => m,
        PackageManifestsShape::One(m) => vec![*m],
    };
    for (index, manifest) in manifests.iter().enumerate() {
        manifest
            .validate()
            .map_err(|e| reindex(e, index))?;
    }
    Ok(manifests)
}

/// Load manifests from `path` and return the first one.
///
/// Callers that only ever deal with single-package archives use this
/// instead of indexing into [`load_package_manifests`] themselves.
pub fn load_single_package_manifest(path: &Path) -> Result<PackageManifest, ManifestError> {
    let manifests = load_package_manifests(path)?;
    manifests
        .into_iter()
        .next()
        .ok_or(ManifestError::InvalidManifest {
            index: 0,
            reason: "manifest file contains no packages".to_string(),
        })
}

/// Write a single package manifest as a JSON object (not wrapped in an
/// array). This is the shape used inside archives and inside installed
/// package directories.
pub fn save_single_package_manifest(
    path: &Path,
    manifest: &PackageManifest,
) -> Result<(), ManifestError> {
    manifest.validate()?;
    let json = serde_json::to_string_pretty(manifest).map_err(|source| ManifestError::Json {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn reindex(err: ManifestError, index: usize) -> ManifestError {
    match err {
        ManifestError::InvalidManifest { reason, .. } => {
            ManifestError::InvalidManifest { index, reason }
        }
        other => other,
    }
}
