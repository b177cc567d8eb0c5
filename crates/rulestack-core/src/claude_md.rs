//! The rule-reference index (`CLAUDE.md`): an append-and-dedupe list read by
//! editor integrations, one `- @<path>` line per installed rule file.

use std::path::Path;

use crate::error::CoreError;

const HEADER: &str = "<!-- RuleStack rule references. Managed by `rfh add`; safe to edit by hand. -->\n";

/// Creates `CLAUDE.md` with just the header comment, if it does not already
/// exist. Safe to call repeatedly.
pub fn ensure_claude_md(path: &Path) -> Result<(), CoreError> {
    if !path.exists() {
        std::fs::write(path, HEADER)?;
    }
    Ok(())
}

/// Appends one `- @.rulestack/<name>.<version>/<relPath>` line per entry in
/// `rel_paths`, skipping any line that is already present verbatim anywhere
/// in the file. Foreign content (prose, other lists a human added) is never
/// touched.
pub fn append_references(
    path: &Path,
    install_path: &str,
    rel_paths: &[String],
) -> Result<(), CoreError> {
    ensure_claude_md(path)?;
    let existing = std::fs::read_to_string(path)?;
    let mut existing_lines: std::collections::HashSet<&str> = existing.lines().collect();

    let mut new_lines = Vec::new();
    let mut to_add = Vec::new();
    for rel_path in rel_paths {
        let line = format!("- @{install_path}/{rel_path}");
        if !existing_lines.contains(line.as_str()) {
            to_add.push(line);
        }
    }
    for line in &to_add {
        new_lines.push(line.as_str());
        existing_lines.insert(line.as_str());
    }

    if new_lines.is_empty() {
        return Ok(());
    }

    let mut content = existing;
    if !content.ends_with('\n') {
        content.push('\n');
    }
    for line in new_lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_file_with_header_on_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CLAUDE.md");
        append_references(&path, ".rulestack/demo.1.0.0", &["a.mdc".to_string()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("- @.rulestack/demo.1.0.0/a.mdc"));
    }

    #[test]
    fn does_not_duplicate_an_existing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CLAUDE.md");
        append_references(&path, ".rulestack/demo.1.0.0", &["a.mdc".to_string()]).unwrap();
        append_references(&path, ".rulestack/demo.1.0.0", &["a.mdc".to_string()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("- @.rulestack/demo.1.0.0/a.mdc").count(), 1);
    }

    #[test]
    fn preserves_foreign_lines_between_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CLAUDE.md");
        append_references(&path, ".rulestack/demo.1.0.0", &["a.mdc".to_string()]).unwrap();

        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("\nSome hand-written notes.\n");
        std::fs::write(&path, &content).unwrap();

        append_references(&path, ".rulestack/demo.1.0.0", &["b.mdc".to_string()]).unwrap();

        let final_content = std::fs::read_to_string(&path).unwrap();
        assert!(final_content.contains("Some hand-written notes."));
        assert!(final_content.contains("- @.rulestack/demo.1.0.0/a.mdc"));
        assert!(final_content.contains("- @.rulestack/demo.1.0.0/b.mdc"));
    }
}
