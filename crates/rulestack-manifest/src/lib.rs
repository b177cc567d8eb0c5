//! Manifest model for RuleStack: the package manifest (`rulestack.json` inside
//! a publishable archive) and the project manifest (`rulestack.json` at the
//! root of a consumer workspace).
//!
//! Both shapes are plain JSON, validated on every load and save. The name and
//! version regexes are authoritative: consumers of this crate must reject
//! anything the regex rejects, rather than loosening validation downstream.

mod error;
mod package;
mod project;
mod sniff;

pub use error::ManifestError;
pub use package::{
    PackageManifest, Target, load_package_manifests, load_single_package_manifest,
    save_single_package_manifest,
};
pub use project::{ProjectManifest, load_project_manifest, save_project_manifest};
pub use sniff::{is_package_manifest, is_project_manifest};

use std::sync::LazyLock;

use regex::Regex;

/// `^(@[a-z0-9][a-z0-9\-_]*/)?[a-z0-9][a-z0-9\-_]*$`
pub static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(@[a-z0-9][a-z0-9\-_]*/)?[a-z0-9][a-z0-9\-_]*$").expect("name regex is valid")
});

#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}
