use std::path::Path;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{multipart, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::context::CallContext;
use crate::error::{ErrorKind, RegistryError};
use crate::types::{Package, PackageVersion, PublishResult, RegistryType, SearchQuery};

/// HTTP JSON-API backend: `rfh`'s default registry client when a config
/// record's URL points at an API endpoint rather than a Git repository.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: String,
    bearer_token: Option<SecretString>,
    verbose: bool,
    client: reqwest::Client,
}

impl HttpRegistry {
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: Option<SecretString>, verbose: bool) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            bearer_token,
            verbose,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.bearer_token {
            if let Ok(mut header) = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                header.set_sensitive(true);
                builder = builder.header(AUTHORIZATION, header);
            }
        }
        builder
    }

    pub async fn search_packages(
        &self,
        ctx: &CallContext,
        query: &SearchQuery,
    ) -> Result<Vec<Package>, RegistryError> {
        let mut params = Vec::new();
        if let Some(q) = &query.query {
            params.push(("q", q.clone()));
        }
        if let Some(tag) = &query.tag {
            params.push(("tag", tag.clone()));
        }
        if let Some(target) = &query.target {
            params.push(("target", target.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self
            .request(reqwest::Method::GET, "/v1/packages")
            .query(&params)
            .timeout(ctx.remaining())
            .send()
            .await?;
        let response = ensure_success(response, None).await?;
        response
            .json::<Vec<Package>>()
            .await
            .map_err(RegistryError::from)
    }

    pub async fn get_package(
        &self,
        ctx: &CallContext,
        name: &str,
    ) -> Result<Package, RegistryError> {
        let path = format!("/v1/packages/{}", urlencoding::encode(name));
        let response = self
            .request(reqwest::Method::GET, &path)
            .timeout(ctx.remaining())
            .send()
            .await?;
        let response = ensure_success(response, Some(ErrorKind::PackageNotFound)).await?;
        response.json::<Package>().await.map_err(RegistryError::from)
    }

    pub async fn get_package_version(
        &self,
        ctx: &CallContext,
        name: &str,
        version: &str,
    ) -> Result<PackageVersion, RegistryError> {
        let path = format!(
            "/v1/packages/{}/versions/{}",
            urlencoding::encode(name),
            urlencoding::encode(version)
        );
        let response = self
            .request(reqwest::Method::GET, &path)
            .timeout(ctx.remaining())
            .send()
            .await?;
        let response = ensure_success(response, Some(ErrorKind::VersionNotFound)).await?;
        response
            .json::<PackageVersion>()
            .await
            .map_err(RegistryError::from)
    }

    pub async fn publish_package(
        &self,
        ctx: &CallContext,
        manifest_path: &Path,
        archive_path: &Path,
    ) -> Result<PublishResult, RegistryError> {
        let manifest_bytes = tokio::fs::read(manifest_path).await?;
        let archive_bytes = tokio::fs::read(archive_path).await?;

        let manifest_part = multipart::Part::bytes(manifest_bytes)
            .file_name("rulestack.json")
            .mime_str("application/json")
            .map_err(|e| RegistryError::with_message(ErrorKind::InvalidManifest, e.to_string()))?;
        let archive_part = multipart::Part::bytes(archive_bytes)
            .file_name("archive.tar.gz")
            .mime_str("application/gzip")
            .map_err(|e| RegistryError::with_message(ErrorKind::InvalidManifest, e.to_string()))?;
        let form = multipart::Form::new()
            .part("manifest", manifest_part)
            .part("archive", archive_part);

        if self.verbose {
            debug!(url = %self.url("/v1/packages"), "publishing package");
        }

        let response = self
            .request(reqwest::Method::POST, "/v1/packages")
            .timeout(ctx.remaining())
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response, None).await?;
        let body: PublishResponseBody = response.json().await.unwrap_or_default();
        Ok(PublishResult {
            message: body.message.unwrap_or_else(|| "published".to_string()),
            pr_url: None,
        })
    }

    pub async fn download_blob(
        &self,
        ctx: &CallContext,
        sha256: &str,
        dest_path: &Path,
    ) -> Result<(), RegistryError> {
        let path = format!("/v1/blobs/{sha256}");
        let response = self
            .request(reqwest::Method::GET, &path)
            .timeout(ctx.remaining())
            .send()
            .await?;
        let response = ensure_success(response, None).await?;
        let bytes = response.bytes().await?;
        tokio::fs::write(dest_path, &bytes).await?;
        Ok(())
    }

    pub async fn health(&self, ctx: &CallContext) -> Result<(), RegistryError> {
        let response = self
            .request(reqwest::Method::GET, "/v1/health")
            .timeout(ctx.remaining())
            .send()
            .await?;
        ensure_success(response, None).await?;
        Ok(())
    }

    #[must_use]
    pub fn registry_type(&self) -> RegistryType {
        RegistryType::Http
    }
}

#[derive(Debug, Default, Deserialize)]
struct PublishResponseBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Maps a response with status >= 400 to a [`RegistryError`]. `not_found_kind`
/// overrides the generic mapping for 404s on endpoints where that status has
/// a specific meaning (package/version lookups).
async fn ensure_success(
    response: reqwest::Response,
    not_found_kind: Option<ErrorKind>,
) -> Result<reqwest::Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    let kind = match status {
        StatusCode::NOT_FOUND => not_found_kind.unwrap_or(ErrorKind::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        _ => ErrorKind::NetworkError,
    };
    Err(RegistryError::with_message(kind, message).with_detail("status", status.as_str()))
}
