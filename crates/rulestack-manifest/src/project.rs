use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ManifestError;

/// Describes a consumer workspace: where it lives, and which packages
/// (exact versions, no ranges) it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub version: String,
    pub project_root: String,
    /// Always present, possibly empty -- never `null`.
    pub dependencies: BTreeMap<String, String>,
}

impl ProjectManifest {
    #[must_use]
    pub fn new(project_root: impl Into<String>) -> Self {
        Self {
            version: "1.0.0".to_string(),
            project_root: project_root.into(),
            dependencies: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.project_root.is_empty() {
            return Err(ManifestError::MissingField("projectRoot"));
        }
        Ok(())
    }

    /// Add or overwrite the dependency entry for `name`.
    pub fn set_dependency(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.dependencies.insert(name.into(), version.into());
    }
}

/// Raw on-disk shape, used to distinguish a missing `dependencies` object
/// (rejected) from an explicit empty one (accepted).
#[derive(Deserialize)]
struct RawProjectManifest {
    version: String,
    #[serde(rename = "projectRoot")]
    project_root: String,
    dependencies: Option<BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct WireProjectManifest<'a> {
    version: &'a str,
    #[serde(rename = "projectRoot")]
    project_root: &'a str,
    dependencies: &'a BTreeMap<String, String>,
}

pub fn load_project_manifest(path: &Path) -> Result<ProjectManifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawProjectManifest =
        serde_json::from_str(&content).map_err(|source| ManifestError::Json {
            path: path.display().to_string(),
            source,
        })?;
    if raw.project_root.is_empty() {
        return Err(ManifestError::MissingField("projectRoot"));
    }
    let dependencies = raw
        .dependencies
        .ok_or(ManifestError::MissingField("dependencies"))?;
    Ok(ProjectManifest {
        version: raw.version,
        project_root: raw.project_root,
        dependencies,
    })
}

pub fn save_project_manifest(path: &Path, manifest: &ProjectManifest) -> Result<(), ManifestError> {
    manifest.validate()?;
    let wire = WireProjectManifest {
        version: &manifest.version,
        project_root: &manifest.project_root,
        dependencies: &manifest.dependencies,
    };
    let json = serde_json::to_string_pretty(&wire).map_err(|source| ManifestError::Json {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })
}
