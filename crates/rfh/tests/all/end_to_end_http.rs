use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{cmd::rfh_cmd, project::TestProject};

fn rfh_toml(registry_url: &str) -> String {
    format!(
        r#"
current = "test"

[registries.test]
url = "{registry_url}"
type = "http"
"#
    )
}

/// Covers the primary end-to-end flow: `init` -> `pack` -> `publish` ->
/// `search` -> `add`, against a mocked HTTP registry.
#[tokio::test]
async fn init_pack_publish_search_add_round_trip() {
    let publisher = TestProject::new();
    rfh_cmd().current_dir(publisher.path()).arg("init").assert().success();
    let rule = publisher.write_rule_file("auth.mdc", "# require auth everywhere");

    rfh_cmd()
        .current_dir(publisher.path())
        .args(["pack", "--file"])
        .arg(&rule)
        .args(["--package", "security", "--version", "1.0.0"])
        .assert()
        .success();

    let archive_path = publisher
        .path()
        .join(".rulestack")
        .join("staged")
        .join("security-1.0.0.tgz");
    let sha256 = rulestack_archive::calculate_sha256(&archive_path).unwrap();
    let archive_bytes = std::fs::read(&archive_path).unwrap();

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "published security@1.0.0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "name": "security",
                "description": null,
                "latest_version": "1.0.0",
                "tags": [],
                "targets": []
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/packages/security"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "security",
            "description": null,
            "latest_version": "1.0.0",
            "tags": [],
            "targets": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/packages/security/versions/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "security",
            "version": "1.0.0",
            "sha256": sha256,
            "size": archive_bytes.len(),
            "targets": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/blobs/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive_bytes.clone()))
        .mount(&server)
        .await;

    publisher.write_rfh_toml(&rfh_toml(&server.uri()));

    rfh_cmd()
        .current_dir(publisher.path())
        .args(["publish", "--package", "security", "--version", "1.0.0"])
        .assert()
        .success();

    rfh_cmd()
        .current_dir(publisher.path())
        .args(["search", "security"])
        .assert()
        .success();

    let consumer = TestProject::new();
    rfh_cmd().current_dir(consumer.path()).arg("init").assert().success();
    consumer.write_rfh_toml(&rfh_toml(&server.uri()));

    rfh_cmd()
        .current_dir(consumer.path())
        .args(["add", "security"])
        .assert()
        .success();

    let installed = consumer
        .path()
        .join(".rulestack")
        .join("security.1.0.0")
        .join("auth.mdc");
    assert!(installed.exists());

    let claude_md = consumer.claude_md();
    assert!(claude_md.contains(".rulestack/security.1.0.0/auth.mdc"));

    let rulestack_json = consumer.rulestack_json();
    assert!(rulestack_json.contains("\"security\""));
}

/// A blob whose bytes don't hash to what the registry advertised must be
/// rejected before extraction, never installed.
#[tokio::test]
async fn add_rejects_tampered_blob() {
    let project = TestProject::new();
    rfh_cmd().current_dir(project.path()).arg("init").assert().success();

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/packages/security"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "security",
            "description": null,
            "latest_version": "1.0.0",
            "tags": [],
            "targets": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/packages/security/versions/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "security",
            "version": "1.0.0",
            "sha256": "0000000000000000000000000000000000000000000000000000000000000000",
            "size": 3,
            "targets": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/blobs/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a real archive".to_vec()))
        .mount(&server)
        .await;

    project.write_rfh_toml(&rfh_toml(&server.uri()));

    rfh_cmd()
        .current_dir(project.path())
        .args(["add", "security"])
        .assert()
        .failure();

    assert!(!project.path().join(".rulestack").join("security.1.0.0").exists());
}
