//! The pack/install state machine: the part of RuleStack that owns the
//! on-disk project layout (project manifest, lockfile, `.rulestack/`,
//! `CLAUDE.md`) across `init`, `pack`, and `add` operations.
//!
//! Everything here is orchestration over the leaf crates
//! (`rulestack-manifest`, `rulestack-archive`, `rulestack-lockfile`,
//! `rulestack-registry`); it owns no wire format or file format of its own.

pub mod claude_md;
mod error;
pub mod init;
pub mod install;
pub mod pack;
pub mod paths;

pub use error::CoreError;
pub use init::init_project;
pub use install::{add_package, InstallOutcome, PackageSpec};
pub use pack::{pack, PackOutcome};
