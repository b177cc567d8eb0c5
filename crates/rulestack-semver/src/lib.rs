//! Version parsing, comparison, and increment rules for RuleStack packages.
//!
//! Versions are plain `MAJOR.MINOR.PATCH[-PRE][+BUILD]` strings, validated with
//! [`VERSION_RE`] and wrapped around [`semver::Version`] for ordering. Unlike
//! Cargo, RuleStack never resolves a version *range*: the registry only ever
//! installs one exact version, and publishing only ever checks that a new
//! version is strictly greater than the one it replaces.

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

mod increment;

pub use increment::VersionIncrement;

/// Validation regex from the RuleStack specification:
/// `MAJOR.MINOR.PATCH` with optional `-PRE` and `+BUILD`.
pub static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(-[A-Za-z0-9-]+)?(\+[A-Za-z0-9-]+)?$")
        .expect("version regex is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version '{0}': must match MAJOR.MINOR.PATCH[-PRE][+BUILD]")]
    InvalidFormat(String),
    #[error("version '{new}' must be greater than current version '{current}'")]
    NotGreater { current: Version, new: Version },
}

/// Parse a version string, enforcing the RuleStack regex before delegating to
/// [`semver::Version::parse`]. `semver` alone is more permissive (it allows
/// arbitrary identifier lists), so the regex is checked first.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    if !VERSION_RE.is_match(raw) {
        return Err(VersionError::InvalidFormat(raw.to_string()));
    }
    Version::parse(raw).map_err(|_| VersionError::InvalidFormat(raw.to_string()))
}

/// `true` if `raw` matches [`VERSION_RE`], without trying to fully parse it.
#[must_use]
pub fn is_valid_version(raw: &str) -> bool {
    VERSION_RE.is_match(raw)
}

/// Numeric compare of major/minor/patch, then pre-release (absence sorts
/// higher than presence), ignoring build metadata entirely. This matches
/// [`semver::Version`]'s own `Ord` impl, which already implements exactly
/// this rule; the wrapper exists so call sites read in domain vocabulary
/// rather than `cmp`.
#[must_use]
pub fn compare(a: &Version, b: &Version) -> std::cmp::Ordering {
    a.cmp(b)
}

/// Fail unless `new` is strictly greater than `current`. This is the single
/// gate every publish or additive pack sits behind: there is no "downgrade"
/// or "republish same version" path.
pub fn validate_version_increase(current: &Version, new: &Version) -> Result<(), VersionError> {
    if compare(new, current).is_gt() {
        Ok(())
    } else {
        Err(VersionError::NotGreater {
            current: current.clone(),
            new: new.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_spec_examples() {
        assert!(is_valid_version("1.0.0"));
        assert!(is_valid_version("1.0.0-alpha1"));
        assert!(is_valid_version("1.0.0+build"));
        assert!(!is_valid_version("1.0"));
    }

    #[test]
    fn compare_is_reflexive() {
        let v = parse_version("1.2.3").unwrap();
        assert_eq!(compare(&v, &v), std::cmp::Ordering::Equal);
    }

    #[test]
    fn build_metadata_is_ignored() {
        let a = parse_version("1.0.0+x").unwrap();
        let b = parse_version("1.0.0+y").unwrap();
        assert_eq!(compare(&a, &b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn absent_prerelease_sorts_higher() {
        let pre = parse_version("1.0.0-alpha").unwrap();
        let released = parse_version("1.0.0").unwrap();
        assert_eq!(compare(&pre, &released), std::cmp::Ordering::Less);
    }

    #[test]
    fn validate_version_increase_rejects_non_increase() {
        let current = parse_version("1.5.0").unwrap();
        for candidate in ["1.5.0", "1.2.0", "1.4.9"] {
            let new = parse_version(candidate).unwrap();
            assert!(validate_version_increase(&current, &new).is_err());
        }
        let new = parse_version("1.5.1").unwrap();
        assert!(validate_version_increase(&current, &new).is_ok());
    }
}
