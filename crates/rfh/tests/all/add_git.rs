//! Git-registry scenarios. A bare local repository stands in for a remote
//! registry host: `GitRegistry` clones it into `~/.rfh/cache/git/...` the
//! same way it would clone `https://github.com/acme/rules.git`, it just
//! never touches the network because the "remote" is a `file://`-style
//! local path.

use std::path::Path;

use rulestack_manifest::{PackageManifest, Target};

use crate::helpers::{cmd::rfh_cmd, project::TestProject};

/// Builds a bare repo at `dir` (which must end in `.git`, matching the
/// suffix `GitRegistry::normalize_repo_url` appends to URLs lacking one)
/// seeded with a single published package, ready to be cloned.
fn seed_registry(bare_dir: &Path, manifest: &PackageManifest, rule_name: &str, rule_body: &str) {
    git2::Repository::init_bare(bare_dir).unwrap();

    let work_dir = tempfile::tempdir().unwrap();
    let work_repo = git2::Repository::init(work_dir.path()).unwrap();
    work_repo
        .remote("origin", bare_dir.to_str().unwrap())
        .unwrap();

    let stage_dir = tempfile::tempdir().unwrap();
    std::fs::write(stage_dir.path().join(rule_name), rule_body).unwrap();
    rulestack_manifest::save_single_package_manifest(
        &stage_dir.path().join("rulestack.json"),
        manifest,
    )
    .unwrap();
    let archive_path = work_dir.path().join("archive.tar.gz");
    let pack_result = rulestack_archive::pack_from_directory(stage_dir.path(), &archive_path).unwrap();

    let version_dir = work_dir
        .path()
        .join("packages")
        .join(&manifest.name)
        .join("versions")
        .join(&manifest.version);
    std::fs::create_dir_all(&version_dir).unwrap();
    std::fs::copy(&archive_path, version_dir.join("archive.tar.gz")).unwrap();
    std::fs::write(
        version_dir.join("manifest.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "name": manifest.name,
            "version": manifest.version,
            "description": manifest.description,
            "targets": manifest.targets,
            "tags": manifest.tags,
            "files": manifest.files,
            "license": manifest.license,
            "sha256": pack_result.sha256,
            "size": pack_result.size_bytes,
            "publishedAt": "2026-01-01T00:00:00Z",
        }))
        .unwrap(),
    )
    .unwrap();

    let metadata_dir = work_dir.path().join("packages").join(&manifest.name);
    std::fs::write(
        metadata_dir.join("metadata.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "name": manifest.name,
            "description": manifest.description,
            "latest": manifest.version,
            "tags": manifest.tags,
            "targets": manifest.targets,
            "versions": [manifest.version],
            "updatedAt": "2026-01-01T00:00:00Z",
        }))
        .unwrap(),
    )
    .unwrap();

    let mut packages = serde_json::Map::new();
    packages.insert(
        manifest.name.clone(),
        serde_json::json!({
            "name": manifest.name,
            "description": manifest.description,
            "latest": manifest.version,
            "tags": manifest.tags,
            "targets": manifest.targets,
            "versions": [manifest.version],
            "updatedAt": "2026-01-01T00:00:00Z",
        }),
    );
    std::fs::write(
        work_dir.path().join("index.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "updatedAt": "2026-01-01T00:00:00Z",
            "packageCount": 1,
            "packages": packages,
        }))
        .unwrap(),
    )
    .unwrap();

    let mut index = work_repo.index().unwrap();
    index
        .add_all(["packages", "index.json"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = work_repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("test", "test@example.com").unwrap();
    work_repo
        .commit(Some("HEAD"), &sig, &sig, "seed registry", &tree, &[])
        .unwrap();

    let head_ref_name = work_repo.head().unwrap().name().unwrap().to_string();
    let refspec = format!("{head_ref_name}:refs/heads/main");
    let mut remote = work_repo.find_remote("origin").unwrap();
    remote.push(&[refspec.as_str()], None).unwrap();

    let bare_repo = git2::Repository::open_bare(bare_dir).unwrap();
    bare_repo.set_head("refs/heads/main").unwrap();
}

fn rfh_toml(registry_path: &Path) -> String {
    format!(
        r#"
current = "origin"

[registries.origin]
url = "{}"
type = "git"
"#,
        registry_path.to_str().unwrap().replace('\\', "/")
    )
}

#[test]
fn add_from_git_registry_installs_seeded_package() {
    let registry_dir = tempfile::tempdir().unwrap();
    let bare_path = registry_dir.path().join("origin.git");
    let manifest = PackageManifest {
        name: "docs".to_string(),
        version: "1.0.0".to_string(),
        description: Some("documentation rules".to_string()),
        targets: vec![Target::ClaudeCode],
        tags: vec!["docs".to_string()],
        files: vec!["rulestack.json".to_string(), "style.mdc".to_string()],
        license: None,
    };
    seed_registry(&bare_path, &manifest, "style.mdc", "# document everything");

    let consumer = TestProject::new();
    rfh_cmd().current_dir(consumer.path()).arg("init").assert().success();
    consumer.write_rfh_toml(&rfh_toml(&bare_path));

    rfh_cmd()
        .current_dir(consumer.path())
        .args(["search", "docs"])
        .assert()
        .success();

    rfh_cmd()
        .current_dir(consumer.path())
        .args(["add", "docs@1.0.0"])
        .assert()
        .success();

    let installed = consumer
        .path()
        .join(".rulestack")
        .join("docs.1.0.0")
        .join("style.mdc");
    assert!(installed.exists());
    assert_eq!(
        std::fs::read_to_string(installed).unwrap(),
        "# document everything"
    );
}

/// Publishing against a Git registry pushes a `publish/<name>/<version>`
/// branch to the bare repo instead of calling an HTTP endpoint; with no
/// `GITHUB_TOKEN` set, `rfh` falls back to reporting a manual compare URL
/// rather than failing the whole operation.
#[test]
fn publish_to_git_registry_pushes_a_branch() {
    let registry_dir = tempfile::tempdir().unwrap();
    let bare_path = registry_dir.path().join("origin.git");
    let seed_manifest = PackageManifest {
        name: "docs".to_string(),
        version: "1.0.0".to_string(),
        description: None,
        targets: vec![],
        tags: vec![],
        files: vec!["rulestack.json".to_string(), "style.mdc".to_string()],
        license: None,
    };
    seed_registry(&bare_path, &seed_manifest, "style.mdc", "# document everything");

    let publisher = TestProject::new();
    rfh_cmd().current_dir(publisher.path()).arg("init").assert().success();
    let rule = publisher.write_rule_file("notes.mdc", "# keep notes tidy");
    publisher.write_rfh_toml(&rfh_toml(&bare_path));

    rfh_cmd()
        .current_dir(publisher.path())
        .args(["pack", "--file"])
        .arg(&rule)
        .args(["--package", "notes", "--version", "1.0.0"])
        .assert()
        .success();

    std::env::remove_var("GITHUB_TOKEN");
    rfh_cmd()
        .current_dir(publisher.path())
        .args(["publish", "--package", "notes", "--version", "1.0.0"])
        .assert()
        .success();

    let bare_repo = git2::Repository::open_bare(&bare_path).unwrap();
    let branch_ref = bare_repo
        .find_reference("refs/heads/publish/notes/1.0.0")
        .expect("publish branch was pushed to the bare registry");
    let tree = branch_ref.peel_to_commit().unwrap().tree().unwrap();
    assert!(tree
        .get_path(Path::new("packages/notes/metadata.json"))
        .is_ok());
}
