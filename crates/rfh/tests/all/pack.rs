use crate::helpers::{cmd::rfh_cmd, project::TestProject};

#[test]
fn pack_new_package_writes_staged_archive() {
    let project = TestProject::new();
    rfh_cmd().current_dir(project.path()).arg("init").assert().success();
    let rule = project.write_rule_file("security.mdc", "# be careful");

    rfh_cmd()
        .current_dir(project.path())
        .arg("pack")
        .arg("--file")
        .arg(&rule)
        .arg("--package")
        .arg("security")
        .arg("--version")
        .arg("1.0.0")
        .assert()
        .success();

    let archive = project
        .path()
        .join(".rulestack")
        .join("staged")
        .join("security-1.0.0.tgz");
    assert!(archive.exists());
}

#[test]
fn pack_rejects_non_mdc_file() {
    let project = TestProject::new();
    rfh_cmd().current_dir(project.path()).arg("init").assert().success();
    let rule = project.write_rule_file("notes.txt", "not a rule");

    rfh_cmd()
        .current_dir(project.path())
        .arg("pack")
        .arg("--file")
        .arg(&rule)
        .arg("--package")
        .arg("security")
        .assert()
        .failure();
}
