//! Lockfile model: records exactly what is installed, at what integrity, so
//! a repeat install can verify without re-contacting the registry.
//!
//! Load-or-create semantics: a missing file yields an empty, writable
//! lockfile rather than an error. Not transactional across files -- callers
//! that also touch the project manifest and `CLAUDE.md` treat the whole
//! sequence as best-effort and rely on idempotence for retry.

use std::collections::BTreeMap;
use std::path::Path;

use rulestack_manifest::Target;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    #[error("failed to read lockfile at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lockfile at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One installed package: the version and integrity hash that were
/// actually verified at install time, plus where it landed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub version: String,
    pub sha256: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    pub install_path: String,
    /// Overrides the top-level `registry` for this one entry, when it was
    /// installed from a non-default source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
}

/// `registry` is the source of truth at install time; `packages` maps the
/// stable key `"<name>@<version>"` to its [`LockEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lockfile {
    #[serde(default)]
    pub registry: String,
    #[serde(default)]
    pub packages: BTreeMap<String, LockEntry>,
}

impl Lockfile {
    #[must_use]
    pub fn package_key(name: &str, version: &str) -> String {
        format!("{name}@{version}")
    }

    /// Loads the lockfile at `path`, or returns an empty one if the file
    /// does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, LockfileError> {
        match fs_err::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| LockfileError::Json {
                path: path.display().to_string(),
                source,
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(LockfileError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Writes the lockfile to `path` atomically: a temp file in the same
    /// directory is written and fsynced, then renamed over `path`, so a
    /// crash mid-write never leaves a truncated lockfile behind.
    pub fn save(&self, path: &Path) -> Result<(), LockfileError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| LockfileError::Json {
            path: path.display().to_string(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| LockfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        use std::io::Write;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|source| LockfileError::Io {
                path: path.display().to_string(),
                source,
            })?;
        tmp.persist(path)
            .map_err(|e| LockfileError::Io {
                path: path.display().to_string(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Inserts or replaces the entry for `key`, creating the `packages` map
    /// if this is the first entry.
    pub fn add_package(&mut self, key: impl Into<String>, entry: LockEntry) {
        self.packages.insert(key.into(), entry);
    }

    pub fn remove_package(&mut self, key: &str) -> Option<LockEntry> {
        self.packages.remove(key)
    }

    #[must_use]
    pub fn has_package(&self, key: &str) -> bool {
        self.packages.contains_key(key)
    }

    #[must_use]
    pub fn get_package(&self, key: &str) -> Option<&LockEntry> {
        self.packages.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LockEntry {
        LockEntry {
            version: "1.0.0".to_string(),
            sha256: "a".repeat(64),
            targets: vec![Target::Cursor],
            install_path: ".rulestack/demo.1.0.0".to_string(),
            registry: None,
        }
    }

    #[test]
    fn missing_file_yields_empty_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rulestack.lock.json");
        let lockfile = Lockfile::load_or_create(&path).unwrap();
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn add_package_then_save_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rulestack.lock.json");

        let mut lockfile = Lockfile::load_or_create(&path).unwrap();
        lockfile.registry = "https://registry.example.com".to_string();
        let key = Lockfile::package_key("demo", "1.0.0");
        lockfile.add_package(key.clone(), entry());
        lockfile.save(&path).unwrap();

        let reloaded = Lockfile::load_or_create(&path).unwrap();
        assert_eq!(reloaded, lockfile);
        assert!(reloaded.has_package(&key));
    }

    #[test]
    fn package_key_is_name_at_version() {
        assert_eq!(Lockfile::package_key("demo", "1.0.0"), "demo@1.0.0");
    }

    #[test]
    fn remove_package_drops_the_entry() {
        let mut lockfile = Lockfile::default();
        let key = Lockfile::package_key("demo", "1.0.0");
        lockfile.add_package(key.clone(), entry());
        assert!(lockfile.remove_package(&key).is_some());
        assert!(!lockfile.has_package(&key));
    }
}
