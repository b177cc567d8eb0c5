use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rulestack_manifest::{PackageManifest, Target};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::context::CallContext;
use crate::error::{ErrorKind, RegistryError};
use crate::types::{Package, PackageVersion, PublishResult, RegistryType, SearchQuery};

const INDEX_FILE: &str = "index.json";
const PACKAGES_DIR: &str = "packages";

/// Git-repo-as-content-store backend: the registry "API" is just the
/// directory layout of a Git repository, reached through a local clone
/// cached under `~/.rfh/cache/git`.
#[derive(Clone)]
pub struct GitRegistry {
    repo_url: String,
    token: Option<SecretString>,
    verbose: bool,
    cache_dir: PathBuf,
    /// Guards every Git operation on this instance; also records whether a
    /// repository handle has already been opened this session, so the
    /// second-and-later call skips the "does `.git` exist" probe.
    opened: Arc<Mutex<bool>>,
}

impl GitRegistry {
    pub fn new(repo_url: &str, token: Option<SecretString>, verbose: bool) -> Result<Self, RegistryError> {
        let repo_url = normalize_repo_url(repo_url);
        let cache_dir = cache_dir_for(&repo_url)?;
        Ok(Self {
            repo_url,
            token,
            verbose,
            cache_dir,
            opened: Arc::new(Mutex::new(false)),
        })
    }

    #[must_use]
    pub fn registry_type(&self) -> RegistryType {
        RegistryType::Git
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    async fn ensure_repo(&self, _ctx: &CallContext) -> Result<PathBuf, RegistryError> {
        let mut guard = self.opened.lock().await;
        let already_open = *guard;
        let cache_dir = self.cache_dir.clone();
        let repo_url = self.repo_url.clone();
        let token = self.token.clone();
        let verbose = self.verbose;
        tokio::task::spawn_blocking(move || {
            ensure_repo_blocking(
                &cache_dir,
                &repo_url,
                token.as_ref().map(ExposeSecret::expose_secret),
                already_open,
                verbose,
            )
        })
        .await
        .map_err(join_error)??;
        *guard = true;
        Ok(self.cache_dir.clone())
    }

    pub async fn health(&self, ctx: &CallContext) -> Result<(), RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        if repo_dir.join(PACKAGES_DIR).exists() || repo_dir.join(INDEX_FILE).exists() {
            Ok(())
        } else {
            Err(RegistryError::with_message(
                ErrorKind::InvalidRegistry,
                "repository has neither packages/ nor index.json",
            ))
        }
    }

    async fn load_index(&self, ctx: &CallContext) -> Result<RegistryIndex, RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        tokio::task::spawn_blocking(move || load_index_blocking(&repo_dir))
            .await
            .map_err(join_error)?
    }

    pub async fn search_packages(
        &self,
        ctx: &CallContext,
        query: &SearchQuery,
    ) -> Result<Vec<Package>, RegistryError> {
        let index = self.load_index(ctx).await?;
        let query_lower = query.query.as_ref().map(|q| q.to_lowercase());
        let tag_exact = query.tag.as_deref();
        let target_substr = query.target.as_ref().map(|t| t.to_lowercase());

        let mut results: Vec<Package> = index
            .packages
            .into_values()
            .filter(|entry| {
                query_lower.as_ref().is_none_or(|q| {
                    entry.name.to_lowercase().contains(q.as_str())
                        || entry
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(q.as_str()))
                })
            })
            .filter(|entry| tag_exact.is_none_or(|tag| entry.tags.iter().any(|t| t == tag)))
            .filter(|entry| {
                target_substr.as_ref().is_none_or(|target| {
                    entry
                        .tags
                        .iter()
                        .any(|t| t.to_lowercase().contains(target.as_str()))
                })
            })
            .map(|entry| Package {
                name: entry.name,
                description: entry.description,
                latest_version: entry.latest,
                versions: entry.versions,
                tags: entry.tags,
                targets: entry.targets,
                updated_at: Some(entry.updated_at),
            })
            .collect();

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    pub async fn get_package(&self, ctx: &CallContext, name: &str) -> Result<Package, RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        let name = name.to_string();
        tokio::task::spawn_blocking(move || {
            let metadata_path = repo_dir.join(PACKAGES_DIR).join(&name).join("metadata.json");
            let content = std::fs::read_to_string(&metadata_path).map_err(|_| {
                RegistryError::with_message(ErrorKind::PackageNotFound, name.clone())
            })?;
            let metadata: PackageMetadata = serde_json::from_str(&content).map_err(|e| {
                RegistryError::with_message(ErrorKind::InvalidRegistry, e.to_string())
            })?;
            Ok(Package {
                name: metadata.name,
                description: metadata.description,
                latest_version: metadata.latest,
                versions: metadata.versions,
                tags: metadata.tags,
                targets: metadata.targets,
                updated_at: Some(metadata.updated_at),
            })
        })
        .await
        .map_err(join_error)?
    }

    pub async fn get_package_version(
        &self,
        ctx: &CallContext,
        name: &str,
        version: &str,
    ) -> Result<PackageVersion, RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        let name = name.to_string();
        let version = version.to_string();
        tokio::task::spawn_blocking(move || {
            let manifest_path = repo_dir
                .join(PACKAGES_DIR)
                .join(&name)
                .join("versions")
                .join(&version)
                .join("manifest.json");
            let content = std::fs::read_to_string(&manifest_path).map_err(|_| {
                RegistryError::with_message(
                    ErrorKind::VersionNotFound,
                    format!("{name}@{version}"),
                )
            })?;
            let published: PublishedManifest = serde_json::from_str(&content).map_err(|e| {
                RegistryError::with_message(ErrorKind::InvalidRegistry, e.to_string())
            })?;
            Ok(PackageVersion {
                name: published.manifest.name,
                version: published.manifest.version,
                description: published.manifest.description,
                sha256: published.sha256,
                size: published.size,
                targets: published.manifest.targets,
                published_at: Some(published.published_at),
            })
        })
        .await
        .map_err(join_error)?
    }

    pub async fn download_blob(
        &self,
        ctx: &CallContext,
        sha256: &str,
        dest_path: &Path,
    ) -> Result<(), RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        let sha256 = sha256.to_string();
        let dest_path = dest_path.to_path_buf();
        tokio::task::spawn_blocking(move || download_blob_blocking(&repo_dir, &sha256, &dest_path))
            .await
            .map_err(join_error)?
    }

    pub async fn publish_package(
        &self,
        ctx: &CallContext,
        manifest_path: &Path,
        archive_path: &Path,
    ) -> Result<PublishResult, RegistryError> {
        let repo_dir = self.ensure_repo(ctx).await?;
        let manifest_path = manifest_path.to_path_buf();
        let archive_path = archive_path.to_path_buf();
        let repo_url = self.repo_url.clone();
        let token = self.token.clone();
        let verbose = self.verbose;
        tokio::task::spawn_blocking(move || {
            publish_blocking(
                &repo_dir,
                &repo_url,
                token.as_ref().map(ExposeSecret::expose_secret),
                &manifest_path,
                &archive_path,
                verbose,
            )
        })
        .await
        .map_err(join_error)?
    }

    /// Clears the cache directory and lays down a fresh registry structure:
    /// `packages/`, a seed `index.json`, and a README, then pushes to `main`.
    pub async fn initialize_registry(&self) -> Result<(), RegistryError> {
        let cache_dir = self.cache_dir.clone();
        let repo_url = self.repo_url.clone();
        let token = self.token.clone();
        tokio::task::spawn_blocking(move || {
            initialize_registry_blocking(&cache_dir, &repo_url, token.as_ref().map(ExposeSecret::expose_secret))
        })
        .await
        .map_err(join_error)?
    }
}

impl std::fmt::Debug for GitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRegistry")
            .field("repo_url", &self.repo_url)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

fn join_error(e: tokio::task::JoinError) -> RegistryError {
    RegistryError::with_message(ErrorKind::ConnectionFailed, e.to_string())
}

/// Right-trims `/` and appends `.git` if the URL does not already end in it.
fn normalize_repo_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(".git") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.git")
    }
}

fn cache_dir_for(repo_url: &str) -> Result<PathBuf, RegistryError> {
    let home = dirs::home_dir().ok_or_else(|| {
        RegistryError::with_message(ErrorKind::ConnectionFailed, "cannot determine home directory")
    })?;
    let repo_name = repo_url
        .trim_end_matches(".git")
        .rsplit('/')
        .next()
        .unwrap_or("registry");
    let mut hasher = Sha256::new();
    hasher.update(repo_url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let suffix = &digest[..8];
    Ok(home
        .join(".rfh")
        .join("cache")
        .join("git")
        .join(format!("{repo_name}-{suffix}")))
}

/// `gitlab.com` -> `oauth2`, `bitbucket.org` -> `x-token-auth`, else `token`.
fn auth_username_for(repo_url: &str) -> &'static str {
    let lower = repo_url.to_lowercase();
    if lower.contains("gitlab.com") {
        "oauth2"
    } else if lower.contains("bitbucket.org") {
        "x-token-auth"
    } else {
        "token"
    }
}

fn remote_callbacks<'a>(repo_url: &str, token: Option<&'a str>) -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    if let Some(token) = token {
        let username = auth_username_for(repo_url);
        callbacks.credentials(move |_url, _username_from_url, _allowed| {
            git2::Cred::userpass_plaintext(username, token)
        });
    }
    callbacks
}

fn map_git_error(e: git2::Error) -> RegistryError {
    let auth_failure = matches!(e.code(), git2::ErrorCode::Auth)
        || matches!(e.class(), git2::ErrorClass::Http | git2::ErrorClass::Ssh | git2::ErrorClass::Net)
            && e.message().to_lowercase().contains("auth");
    if auth_failure {
        RegistryError::with_message(ErrorKind::Unauthorized, e.message().to_string())
    } else {
        RegistryError::with_message(ErrorKind::ConnectionFailed, e.message().to_string())
    }
}

fn ensure_repo_blocking(
    cache_dir: &Path,
    repo_url: &str,
    token: Option<&str>,
    already_open: bool,
    verbose: bool,
) -> Result<(), RegistryError> {
    if already_open || cache_dir.join(".git").exists() {
        if verbose {
            debug!(path = %cache_dir.display(), "opening cached registry clone");
        }
        let repo = git2::Repository::open(cache_dir).map_err(map_git_error)?;
        pull(&repo, repo_url, token)
    } else {
        if verbose {
            debug!(url = %repo_url, path = %cache_dir.display(), "cloning registry");
        }
        std::fs::create_dir_all(cache_dir.parent().unwrap_or(cache_dir))?;
        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(repo_url, token));
        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_options);
        builder.clone(repo_url, cache_dir).map_err(map_git_error)?;
        Ok(())
    }
}

fn pull(repo: &git2::Repository, repo_url: &str, token: Option<&str>) -> Result<(), RegistryError> {
    let mut remote = repo.find_remote("origin").map_err(map_git_error)?;
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(repo_url, token));
    remote
        .fetch(&[] as &[&str], Some(&mut fetch_options), None)
        .map_err(map_git_error)?;

    let fetch_head = match repo.find_reference("FETCH_HEAD") {
        Ok(reference) => reference,
        Err(_) => return Ok(()), // nothing fetched (e.g. brand-new empty repo)
    };
    let fetch_commit = repo
        .reference_to_annotated_commit(&fetch_head)
        .map_err(map_git_error)?;
    let analysis = repo.merge_analysis(&[&fetch_commit]).map_err(map_git_error)?;
    if analysis.0.is_up_to_date() {
        return Ok(());
    }

    let mut head_ref = repo.head().map_err(map_git_error)?;
    head_ref
        .set_target(fetch_commit.id(), "fast-forward")
        .map_err(map_git_error)?;
    repo.set_head(head_ref.name().unwrap_or("HEAD"))
        .map_err(map_git_error)?;
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .map_err(map_git_error)?;
    Ok(())
}

fn load_index_blocking(repo_dir: &Path) -> Result<RegistryIndex, RegistryError> {
    let index_path = repo_dir.join(INDEX_FILE);
    match std::fs::read_to_string(&index_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(index) => Ok(index),
            Err(e) => {
                warn!(error = %e, "index.json corrupt, rebuilding from packages/*/metadata.json");
                rebuild_index(repo_dir)
            }
        },
        Err(_) => rebuild_index(repo_dir),
    }
}

fn rebuild_index(repo_dir: &Path) -> Result<RegistryIndex, RegistryError> {
    let packages_dir = repo_dir.join(PACKAGES_DIR);
    let mut packages = BTreeMap::new();
    if packages_dir.is_dir() {
        for entry in std::fs::read_dir(&packages_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let metadata_path = entry.path().join("metadata.json");
            let Ok(content) = std::fs::read_to_string(&metadata_path) else {
                continue;
            };
            let Ok(metadata) = serde_json::from_str::<PackageMetadata>(&content) else {
                continue;
            };
            packages.insert(metadata.name.clone(), metadata);
        }
    }
    Ok(RegistryIndex {
        updated_at: String::new(),
        package_count: packages.len(),
        packages,
    })
}

fn download_blob_blocking(repo_dir: &Path, sha256: &str, dest_path: &Path) -> Result<(), RegistryError> {
    let packages_dir = repo_dir.join(PACKAGES_DIR);
    for entry in walkdir_archives(&packages_dir) {
        let candidate_hash = rulestack_archive::calculate_sha256(&entry)?;
        if candidate_hash == sha256 {
            std::fs::copy(&entry, dest_path)?;
            return Ok(());
        }
    }
    Err(RegistryError::with_message(
        ErrorKind::NotFound,
        format!("no archive with sha256 {sha256} found in registry"),
    ))
}

fn walkdir_archives(packages_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if !packages_dir.is_dir() {
        return found;
    }
    for entry in walkdir::WalkDir::new(packages_dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() && entry.file_name() == "archive.tar.gz" {
            found.push(entry.path().to_path_buf());
        }
    }
    found
}

fn git_signature() -> Result<git2::Signature<'static>, RegistryError> {
    let name = std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| "RuleStack Publisher".to_string());
    let email =
        std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| "publisher@rulestack.dev".to_string());
    git2::Signature::now(&name, &email).map_err(map_git_error)
}

#[allow(clippy::too_many_lines)]
fn publish_blocking(
    repo_dir: &Path,
    repo_url: &str,
    token: Option<&str>,
    manifest_path: &Path,
    archive_path: &Path,
    verbose: bool,
) -> Result<PublishResult, RegistryError> {
    let manifest_content = std::fs::read_to_string(manifest_path)?;
    let manifest: PackageManifest = serde_json::from_str(&manifest_content)
        .map_err(|e| RegistryError::with_message(ErrorKind::InvalidManifest, e.to_string()))?;

    let repo = git2::Repository::open(repo_dir).map_err(map_git_error)?;
    pull(&repo, repo_url, token)?;

    let branch_name = format!("publish/{}/{}", manifest.name, manifest.version);
    create_branch(&repo, &branch_name)?;

    let sha256 = rulestack_archive::calculate_sha256(archive_path)?;
    let size_bytes = std::fs::metadata(archive_path)?.len();
    let published_at = chrono::Utc::now().to_rfc3339();

    let published = PublishedManifest {
        manifest: manifest.clone(),
        sha256: sha256.clone(),
        size: size_bytes,
        published_at: published_at.clone(),
    };

    let package_dir = repo_dir.join(PACKAGES_DIR).join(&manifest.name);
    let version_dir = package_dir.join("versions").join(&manifest.version);
    std::fs::create_dir_all(&version_dir)?;
    std::fs::write(
        version_dir.join("manifest.json"),
        serde_json::to_string_pretty(&published)
            .map_err(|e| RegistryError::with_message(ErrorKind::PublishFailed, e.to_string()))?,
    )?;
    std::fs::copy(archive_path, version_dir.join("archive.tar.gz"))?;

    update_package_metadata(&package_dir, &manifest, &published_at)?;
    update_registry_index(repo_dir, &manifest, &published_at)?;

    if verbose {
        debug!(branch = %branch_name, "staging publish commit");
    }
    commit_and_push(&repo, &branch_name, &manifest, repo_url, token)?;

    let pr_message = attempt_create_pull_request(repo_url, &branch_name, &manifest)
        .unwrap_or_else(|manual_url| format!("published; open a pull request manually: {manual_url}"));

    Ok(PublishResult {
        message: pr_message,
        pr_url: None,
    })
}

fn create_branch(repo: &git2::Repository, branch_name: &str) -> Result<(), RegistryError> {
    let head_commit = repo.head().and_then(|h| h.peel_to_commit()).map_err(map_git_error)?;
    match repo.branch(branch_name, &head_commit, false) {
        Ok(_) => {}
        Err(e) if e.code() == git2::ErrorCode::Exists => {}
        Err(e) => return Err(map_git_error(e)),
    }
    let refname = format!("refs/heads/{branch_name}");
    let obj = repo.revparse_single(&refname).map_err(map_git_error)?;
    repo.checkout_tree(&obj, None).map_err(map_git_error)?;
    repo.set_head(&refname).map_err(map_git_error)?;
    Ok(())
}

fn update_package_metadata(
    package_dir: &Path,
    manifest: &PackageManifest,
    updated_at: &str,
) -> Result<(), RegistryError> {
    let metadata_path = package_dir.join("metadata.json");
    let mut metadata = std::fs::read_to_string(&metadata_path)
        .ok()
        .and_then(|c| serde_json::from_str::<PackageMetadata>(&c).ok())
        .unwrap_or_else(|| PackageMetadata {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            latest: manifest.version.clone(),
            tags: manifest.tags.clone(),
            targets: manifest.targets.clone(),
            versions: Vec::new(),
            updated_at: updated_at.to_string(),
        });

    if !metadata.versions.contains(&manifest.version) {
        metadata.versions.push(manifest.version.clone());
    }
    metadata.description = manifest.description.clone();
    metadata.tags = manifest.tags.clone();
    metadata.targets = manifest.targets.clone();
    metadata.latest = manifest.version.clone();
    metadata.updated_at = updated_at.to_string();

    std::fs::write(
        &metadata_path,
        serde_json::to_string_pretty(&metadata)
            .map_err(|e| RegistryError::with_message(ErrorKind::PublishFailed, e.to_string()))?,
    )?;
    Ok(())
}

fn update_registry_index(
    repo_dir: &Path,
    manifest: &PackageManifest,
    updated_at: &str,
) -> Result<(), RegistryError> {
    let mut index = load_index_blocking(repo_dir).unwrap_or(RegistryIndex {
        updated_at: String::new(),
        package_count: 0,
        packages: BTreeMap::new(),
    });
    index.packages.insert(
        manifest.name.clone(),
        PackageMetadata {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            latest: manifest.version.clone(),
            tags: manifest.tags.clone(),
            targets: manifest.targets.clone(),
            versions: vec![manifest.version.clone()],
            updated_at: updated_at.to_string(),
        },
    );
    index.package_count = index.packages.len();
    index.updated_at = updated_at.to_string();
    std::fs::write(
        repo_dir.join(INDEX_FILE),
        serde_json::to_string_pretty(&index)
            .map_err(|e| RegistryError::with_message(ErrorKind::PublishFailed, e.to_string()))?,
    )?;
    Ok(())
}

fn commit_and_push(
    repo: &git2::Repository,
    branch_name: &str,
    manifest: &PackageManifest,
    repo_url: &str,
    token: Option<&str>,
) -> Result<(), RegistryError> {
    let mut index = repo.index().map_err(map_git_error)?;
    index
        .add_all(
            [format!("{PACKAGES_DIR}/{}", manifest.name), INDEX_FILE.to_string()],
            git2::IndexAddOption::DEFAULT,
            None,
        )
        .map_err(map_git_error)?;
    index.write().map_err(map_git_error)?;
    let tree_id = index.write_tree().map_err(map_git_error)?;
    let tree = repo.find_tree(tree_id).map_err(map_git_error)?;
    let parent = repo.head().and_then(|h| h.peel_to_commit()).map_err(map_git_error)?;
    let sig = git_signature()?;
    let message = format!("publish {} v{}", manifest.name, manifest.version);
    repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&parent])
        .map_err(map_git_error)?;

    let mut remote = repo.find_remote("origin").map_err(map_git_error)?;
    let mut push_options = git2::PushOptions::new();
    push_options.remote_callbacks(remote_callbacks(repo_url, token));
    let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");
    match remote.push(&[refspec.as_str()], Some(&mut push_options)) {
        Ok(()) => Ok(()),
        Err(e) if e.message().to_lowercase().contains("up to date") => Ok(()),
        Err(e) => Err(map_git_error(e)),
    }
}

/// Attempts to open a GitHub pull request for the pushed branch. Returns
/// `Ok(message)` on success, or `Err(manual_pr_url)` when the API call
/// failed so the caller can still report a constructable URL.
fn attempt_create_pull_request(
    repo_url: &str,
    branch_name: &str,
    manifest: &PackageManifest,
) -> Result<String, String> {
    let Some((owner, repo)) = parse_github_owner_repo(repo_url) else {
        return Err(manual_pr_url(repo_url, branch_name));
    };
    let Ok(token) = std::env::var("GITHUB_TOKEN") else {
        return Err(manual_pr_url(repo_url, branch_name));
    };
    let username =
        std::env::var("GITHUB_USERNAME").or_else(|_| std::env::var("GIT_USER")).unwrap_or_default();

    let client = match reqwest::blocking::Client::builder()
        .user_agent(format!("rfh/{}", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(_) => return Err(manual_pr_url(repo_url, branch_name)),
    };

    if !username.is_empty() {
        let collaborator_url = format!("https://api.github.com/repos/{owner}/{repo}/collaborators/{username}");
        let is_collaborator = client
            .get(&collaborator_url)
            .bearer_auth(&token)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false);
        if !is_collaborator {
            return Err(manual_pr_url(repo_url, branch_name));
        }
    }

    let body = serde_json::json!({
        "title": format!("publish {} v{}", manifest.name, manifest.version),
        "head": branch_name,
        "base": "main",
    });
    let response = client
        .post(format!("https://api.github.com/repos/{owner}/{repo}/pulls"))
        .bearer_auth(&token)
        .json(&body)
        .send();

    match response {
        Ok(r) if r.status().is_success() => {
            let json: serde_json::Value = r.json().unwrap_or_default();
            let html_url = json
                .get("html_url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(format!("pull request opened: {html_url}"))
        }
        _ => Err(manual_pr_url(repo_url, branch_name)),
    }
}

fn manual_pr_url(repo_url: &str, branch_name: &str) -> String {
    let base = repo_url.trim_end_matches(".git");
    format!("{base}/compare/main...{branch_name}?expand=1")
}

fn parse_github_owner_repo(repo_url: &str) -> Option<(String, String)> {
    let git_url = git_url_parse::GitUrl::parse(repo_url).ok()?;
    if !git_url.host()?.contains("github") {
        return None;
    }
    let path = git_url.path();
    let trimmed = path.trim_start_matches('/').trim_end_matches(".git");
    let mut parts = trimmed.splitn(2, '/');
    let owner = parts.next()?.to_string();
    let repo = parts.next()?.to_string();
    Some((owner, repo))
}

fn initialize_registry_blocking(
    cache_dir: &Path,
    repo_url: &str,
    token: Option<&str>,
) -> Result<(), RegistryError> {
    if cache_dir.exists() {
        std::fs::remove_dir_all(cache_dir)?;
    }
    std::fs::create_dir_all(cache_dir)?;

    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(repo_url, token));
    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);
    let repo = match builder.clone(repo_url, cache_dir) {
        Ok(repo) => repo,
        Err(_) => {
            // Remote is empty or unreachable for clone; bootstrap locally instead.
            git2::Repository::init(cache_dir).map_err(map_git_error)?
        }
    };

    std::fs::create_dir_all(cache_dir.join(PACKAGES_DIR))?;
    let seed_index = RegistryIndex {
        updated_at: chrono::Utc::now().to_rfc3339(),
        package_count: 0,
        packages: BTreeMap::new(),
    };
    std::fs::write(
        cache_dir.join(INDEX_FILE),
        serde_json::to_string_pretty(&seed_index)
            .map_err(|e| RegistryError::with_message(ErrorKind::PublishFailed, e.to_string()))?,
    )?;
    std::fs::write(
        cache_dir.join("README.md"),
        "# RuleStack registry\n\nThis repository is a RuleStack package registry.\n",
    )?;

    let mut index = repo.index().map_err(map_git_error)?;
    index
        .add_all(["packages", INDEX_FILE, "README.md"], git2::IndexAddOption::DEFAULT, None)
        .map_err(map_git_error)?;
    index.write().map_err(map_git_error)?;
    let tree_id = index.write_tree().map_err(map_git_error)?;
    let tree = repo.find_tree(tree_id).map_err(map_git_error)?;
    let sig = git_signature()?;
    let parents = match repo.head().and_then(|h| h.peel_to_commit()) {
        Ok(commit) => vec![commit],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "Initial registry structure", &tree, &parent_refs)
        .map_err(map_git_error)?;

    if repo.find_remote("origin").is_err() {
        repo.remote("origin", repo_url).map_err(map_git_error)?;
    }
    let mut remote = repo.find_remote("origin").map_err(map_git_error)?;
    let mut push_options = git2::PushOptions::new();
    push_options.remote_callbacks(remote_callbacks(repo_url, token));
    match remote.push(&["refs/heads/main:refs/heads/main"], Some(&mut push_options)) {
        Ok(()) => Ok(()),
        Err(e) if e.message().to_lowercase().contains("up to date") => Ok(()),
        Err(e) => Err(map_git_error(e)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryIndex {
    #[serde(default, rename = "updatedAt")]
    updated_at: String,
    #[serde(default, rename = "packageCount")]
    package_count: usize,
    #[serde(default)]
    packages: BTreeMap<String, PackageMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackageMetadata {
    name: String,
    #[serde(default)]
    description: Option<String>,
    latest: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    targets: Vec<Target>,
    #[serde(default)]
    versions: Vec<String>,
    #[serde(default, rename = "updatedAt")]
    updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PublishedManifest {
    #[serde(flatten)]
    manifest: PackageManifest,
    sha256: String,
    size: u64,
    #[serde(rename = "publishedAt")]
    published_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash_and_missing_dot_git() {
        assert_eq!(
            normalize_repo_url("https://github.com/acme/rules/"),
            "https://github.com/acme/rules.git"
        );
        assert_eq!(
            normalize_repo_url("https://github.com/acme/rules.git"),
            "https://github.com/acme/rules.git"
        );
    }

    #[test]
    fn auth_username_is_provider_specific() {
        assert_eq!(auth_username_for("https://gitlab.com/acme/rules.git"), "oauth2");
        assert_eq!(
            auth_username_for("https://bitbucket.org/acme/rules.git"),
            "x-token-auth"
        );
        assert_eq!(auth_username_for("https://github.com/acme/rules.git"), "token");
    }

    #[test]
    fn cache_dir_is_stable_for_the_same_url() {
        let a = cache_dir_for("https://github.com/acme/rules.git").unwrap();
        let b = cache_dir_for("https://github.com/acme/rules.git").unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with(a.file_name().unwrap()));
    }

    #[test]
    fn parses_github_owner_repo() {
        let (owner, repo) = parse_github_owner_repo("https://github.com/acme/rules.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "rules");
    }
}
