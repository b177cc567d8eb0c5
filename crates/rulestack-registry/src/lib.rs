//! Registry-client abstraction for RuleStack.
//!
//! A [`RegistryConfig`] resolves to one of two backends — [`HttpRegistry`]
//! for a JSON API endpoint, [`GitRegistry`] for a Git repository used as a
//! content store — behind the single [`RegistryClient`] enum. Callers never
//! match on the backend; they call the same six operations regardless of
//! which one is in play.

mod context;
mod error;
mod git;
mod http;
mod types;

use std::path::Path;

pub use context::{CallContext, DEFAULT_TIMEOUT};
pub use error::{ErrorKind, RegistryError};
pub use git::GitRegistry;
pub use http::HttpRegistry;
pub use types::{effective_type, Package, PackageVersion, PublishResult, RegistryConfig, RegistryType, SearchQuery};

/// Dispatches to whichever backend a [`RegistryConfig`] resolves to.
///
/// This is an enum, not a trait object: the backend set is closed and known
/// at compile time, so dynamic dispatch and the `Send`-bound gymnastics of
/// `async fn` in traits buy nothing here.
#[derive(Debug, Clone)]
pub enum RegistryClient {
    Http(HttpRegistry),
    Git(GitRegistry),
}

impl RegistryClient {
    /// Builds the appropriate backend for `config`, inferring the registry
    /// type from the URL via [`effective_type`] when `config.registry_type`
    /// is unset.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let registry_type = config.registry_type.unwrap_or_else(|| effective_type(&config.url));
        match registry_type {
            RegistryType::Http => Ok(Self::Http(HttpRegistry::new(
                config.url.clone(),
                config.token.clone(),
                config.verbose,
            ))),
            RegistryType::Git => Ok(Self::Git(GitRegistry::new(
                &config.url,
                config.token.clone(),
                config.verbose,
            )?)),
        }
    }

    #[must_use]
    pub fn registry_type(&self) -> RegistryType {
        match self {
            Self::Http(backend) => backend.registry_type(),
            Self::Git(backend) => backend.registry_type(),
        }
    }

    pub async fn search_packages(
        &self,
        ctx: &CallContext,
        query: &SearchQuery,
    ) -> Result<Vec<Package>, RegistryError> {
        match self {
            Self::Http(backend) => backend.search_packages(ctx, query).await,
            Self::Git(backend) => backend.search_packages(ctx, query).await,
        }
    }

    pub async fn get_package(&self, ctx: &CallContext, name: &str) -> Result<Package, RegistryError> {
        match self {
            Self::Http(backend) => backend.get_package(ctx, name).await,
            Self::Git(backend) => backend.get_package(ctx, name).await,
        }
    }

    pub async fn get_package_version(
        &self,
        ctx: &CallContext,
        name: &str,
        version: &str,
    ) -> Result<PackageVersion, RegistryError> {
        match self {
            Self::Http(backend) => backend.get_package_version(ctx, name, version).await,
            Self::Git(backend) => backend.get_package_version(ctx, name, version).await,
        }
    }

    pub async fn publish_package(
        &self,
        ctx: &CallContext,
        manifest_path: &Path,
        archive_path: &Path,
    ) -> Result<PublishResult, RegistryError> {
        match self {
            Self::Http(backend) => backend.publish_package(ctx, manifest_path, archive_path).await,
            Self::Git(backend) => backend.publish_package(ctx, manifest_path, archive_path).await,
        }
    }

    pub async fn download_blob(
        &self,
        ctx: &CallContext,
        sha256: &str,
        dest_path: &Path,
    ) -> Result<(), RegistryError> {
        match self {
            Self::Http(backend) => backend.download_blob(ctx, sha256, dest_path).await,
            Self::Git(backend) => backend.download_blob(ctx, sha256, dest_path).await,
        }
    }

    pub async fn health(&self, ctx: &CallContext) -> Result<(), RegistryError> {
        match self {
            Self::Http(backend) => backend.health(ctx).await,
            Self::Git(backend) => backend.health(ctx).await,
        }
    }

    /// Bootstraps a fresh registry layout at the Git backend's remote.
    /// Returns [`ErrorKind::InvalidOperation`] for an HTTP-backed client,
    /// which has no notion of "creating" a remote API.
    pub async fn initialize_registry(&self) -> Result<(), RegistryError> {
        match self {
            Self::Http(_) => Err(RegistryError::with_message(
                ErrorKind::InvalidOperation,
                "HTTP registries cannot be initialized by the client; the server owns that API",
            )),
            Self::Git(backend) => backend.initialize_registry().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_picks_http_for_api_url() {
        let config = RegistryConfig {
            url: "https://registry.example.com/api".to_string(),
            registry_type: None,
            token: None,
            verbose: false,
        };
        let client = RegistryClient::from_config(&config).unwrap();
        assert_eq!(client.registry_type(), RegistryType::Http);
    }

    #[test]
    fn from_config_picks_git_for_github_url() {
        let config = RegistryConfig {
            url: "https://github.com/acme/rules".to_string(),
            registry_type: None,
            token: None,
            verbose: false,
        };
        let client = RegistryClient::from_config(&config).unwrap();
        assert_eq!(client.registry_type(), RegistryType::Git);
    }

    #[test]
    fn explicit_registry_type_overrides_heuristic() {
        let config = RegistryConfig {
            url: "https://github.com/acme/rules".to_string(),
            registry_type: Some(RegistryType::Http),
            token: None,
            verbose: false,
        };
        let client = RegistryClient::from_config(&config).unwrap();
        assert_eq!(client.registry_type(), RegistryType::Http);
    }
}
