use rulestack_archive::ArchiveError;
use rulestack_lockfile::LockfileError;
use rulestack_manifest::ManifestError;
use rulestack_registry::RegistryError;

/// Errors raised by the pack/install state machine.
///
/// Leaf-crate errors (`ManifestError`, `ArchiveError`, `LockfileError`,
/// `RegistryError`) are wrapped via `#[from]` where the orchestrator has
/// nothing useful to add; the remaining variants cover conditions none of
/// those crates can express on their own.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("'{0}' is already an initialized RuleStack project")]
    AlreadyInitialized(String),

    #[error("'{0}' does not look like a RuleStack project (no rulestack.json)")]
    NotAProjectWorkspace(String),

    #[error("version '{new}' must be greater than current version '{current}' for package '{name}'")]
    VersionNotIncreasing {
        name: String,
        current: String,
        new: String,
    },

    #[error("'{0}' is already one of the installed rule files for this package; rename it or bump the version explicitly")]
    FileNameCollision(String),

    #[error("'{0}' is not a .mdc rule file")]
    NotAnMdcFile(String),

    #[error(
        "integrity check failed for {name}@{version}: registry advertised sha256 {expected}, downloaded bytes hash to {actual}"
    )]
    IntegrityMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    #[error("package '{0}' is not installed in this project")]
    PackageNotInstalled(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
