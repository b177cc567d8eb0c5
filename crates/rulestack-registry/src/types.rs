use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use rulestack_manifest::Target;

/// Which backend a registry configuration resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryType {
    Http,
    Git,
}

/// A search/list result entry. Coerced from whatever shape each backend's
/// source of truth actually stores (a JSON API response for HTTP, a
/// `metadata.json` file for Git).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latest_version: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A single published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Search parameters. All fields are optional filters; `limit` is honored
/// deterministically by backend iteration order.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub target: Option<String>,
    pub limit: Option<usize>,
}

/// Result of a successful publish. `pr_url` is populated only when the
/// backend opened (or could construct a link to) a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub message: String,
    pub pr_url: Option<String>,
}

/// Registry configuration as loaded from `rfh`'s config file: a URL, an
/// explicit backend type (or `None` to trigger [`effective_type`]), and an
/// optional bearer/basic-auth token.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub url: String,
    pub registry_type: Option<RegistryType>,
    pub token: Option<SecretString>,
    pub verbose: bool,
}

/// Heuristic used when a configuration record leaves `type` unset: treat the
/// URL as a Git registry when it looks like a clonable repository reference
/// rather than an HTTP API endpoint.
#[must_use]
pub fn effective_type(url: &str) -> RegistryType {
    let lower = url.to_lowercase();
    if lower.ends_with(".git")
        || lower.starts_with("git@")
        || lower.starts_with("ssh://")
        || lower.starts_with("git://")
        || lower.contains("github.com")
        || lower.contains("gitlab.com")
        || lower.contains("bitbucket.org")
        || lower.contains("gitea")
    {
        RegistryType::Git
    } else {
        RegistryType::Http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_api_endpoint_is_http() {
        assert_eq!(
            effective_type("https://registry.example.com/api"),
            RegistryType::Http
        );
    }

    #[test]
    fn github_url_is_git() {
        assert_eq!(
            effective_type("https://github.com/acme/rules"),
            RegistryType::Git
        );
    }

    #[test]
    fn dot_git_suffix_is_git() {
        assert_eq!(
            effective_type("https://example.com/acme/rules.git"),
            RegistryType::Git
        );
    }
}
