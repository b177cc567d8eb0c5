use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A scratch project directory, torn down when dropped.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_rfh_toml(&self, contents: &str) {
        std::fs::write(self.path().join("rfh.toml"), contents).unwrap();
    }

    pub fn write_rule_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn rulestack_json(&self) -> String {
        std::fs::read_to_string(self.path().join("rulestack.json")).unwrap()
    }

    pub fn claude_md(&self) -> String {
        std::fs::read_to_string(self.path().join("CLAUDE.md")).unwrap()
    }
}
