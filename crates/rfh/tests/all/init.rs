use crate::helpers::{cmd::rfh_cmd, project::TestProject};

#[test]
fn init_creates_manifest_claude_md_and_staged_dir() {
    let project = TestProject::new();

    rfh_cmd()
        .current_dir(project.path())
        .arg("init")
        .assert()
        .success();

    assert!(project.path().join("rulestack.json").exists());
    assert!(project.path().join("CLAUDE.md").exists());
    assert!(project.path().join(".rulestack").join("staged").is_dir());
}

#[test]
fn init_twice_fails() {
    let project = TestProject::new();

    rfh_cmd().current_dir(project.path()).arg("init").assert().success();
    rfh_cmd().current_dir(project.path()).arg("init").assert().failure();
}
