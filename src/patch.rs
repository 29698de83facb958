//! Fix application
//!
//! Applies parsed fix records against the working tree, one at a time.
//! Every fix re-reads its target file and re-locates the block before
//! writing, so earlier fixes to the same file shifting line numbers is
//! handled without any offset bookkeeping. This discipline is only correct
//! under strictly sequential application; do not parallelize without adding
//! file-level mutual exclusion.

use std::fs;
use std::path::Path;

use crate::block::BlockDescriptor;
use crate::locate::{find_block_span, LineSpan};
use crate::remediation::FixRecord;
use crate::util::resolve_target_path;

/// Per-fix result for the status stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixStatus {
    Applied { span: LineSpan },
    FileNotFound,
    BlockNotFound,
    /// Read or write failure; the target file is left in its prior state.
    IoError(String),
}

impl FixStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, FixStatus::Applied { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixStatus::Applied { .. } => "applied",
            FixStatus::FileNotFound => "file not found",
            FixStatus::BlockNotFound => "block not found",
            FixStatus::IoError(_) => "io error",
        }
    }
}

/// Outcome of one fix attempt, consumed by reporting and publication.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub file: String,
    pub block_name: String,
    pub status: FixStatus,
}

/// Apply all fixes in order. One fix failing never stops the rest.
pub fn apply_fixes(root: &Path, fixes: &[FixRecord]) -> Vec<FixOutcome> {
    fixes.iter().map(|fix| apply_fix(root, fix)).collect()
}

/// Apply a single fix: verify the file exists, read it fresh, locate the
/// named block, and splice the replacement over its line span. Everything
/// outside the span is preserved byte for byte.
pub fn apply_fix(root: &Path, fix: &FixRecord) -> FixOutcome {
    let outcome = |status| FixOutcome {
        file: fix.file.clone(),
        block_name: fix.block_name.clone(),
        status,
    };

    let path = resolve_target_path(root, &fix.file);
    if !path.exists() {
        return outcome(FixStatus::FileNotFound);
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => return outcome(FixStatus::IoError(format!("read failed: {}", e))),
    };

    // Terminator-preserving split, so unrelated lines (including CRLF
    // endings and a missing final newline) survive the rewrite untouched.
    let lines: Vec<String> = content.split_inclusive('\n').map(String::from).collect();

    let descriptor = BlockDescriptor::parse(&fix.block_name);
    let span = match find_block_span(&lines, &descriptor) {
        Some(span) => span,
        None => return outcome(FixStatus::BlockNotFound),
    };

    let mut patched = String::new();
    for line in &lines[..span.start - 1] {
        patched.push_str(line);
    }
    for line in fix.suggestion.trim().lines() {
        patched.push_str(line);
        patched.push('\n');
    }
    for line in &lines[span.end..] {
        patched.push_str(line);
    }

    match write_atomic(&path, &patched) {
        Ok(()) => outcome(FixStatus::Applied { span }),
        Err(e) => outcome(FixStatus::IoError(e)),
    }
}

/// Write via a sibling temp file plus rename so a failed write never leaves
/// the target with partial content.
fn write_atomic(path: &Path, content: &str) -> Result<(), String> {
    let tmp_path = path.with_extension("tf.tmp");

    fs::write(&tmp_path, content).map_err(|e| format!("write failed: {}", e))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(format!("rename failed: {}", e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fix(file: &str, block_name: &str, suggestion: &str) -> FixRecord {
        FixRecord {
            file: file.to_string(),
            block_name: block_name.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn read_file(dir: &TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_apply_replaces_block_and_preserves_surroundings() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "main.tf",
            "provider \"aws\" {\n  region = \"us-east-1\"\n}\n\nresource \"aws_instance\" \"example\" {\n  ami = \"x\"\n}\n\n# trailing comment\n",
        );

        let outcome = apply_fix(
            dir.path(),
            &fix(
                "main.tf",
                "resource \"aws_instance\" \"example\"",
                "resource \"aws_instance\" \"example\" {\n  ami = \"y\"\n}",
            ),
        );

        assert!(outcome.status.is_applied());
        assert_eq!(
            read_file(&dir, "main.tf"),
            "provider \"aws\" {\n  region = \"us-east-1\"\n}\n\nresource \"aws_instance\" \"example\" {\n  ami = \"y\"\n}\n\n# trailing comment\n"
        );
    }

    #[test]
    fn test_file_not_found() {
        let dir = TempDir::new().unwrap();
        let outcome = apply_fix(dir.path(), &fix("missing.tf", "locals", "locals {\n}"));
        assert_eq!(outcome.status, FixStatus::FileNotFound);
        assert_eq!(outcome.status.label(), "file not found");
    }

    #[test]
    fn test_block_not_found_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let original = "resource \"aws_instance\" \"other\" {\n  ami = \"x\"\n}\n";
        write_file(&dir, "main.tf", original);

        let outcome = apply_fix(
            dir.path(),
            &fix(
                "main.tf",
                "resource \"aws_instance\" \"example\"",
                "resource \"aws_instance\" \"example\" {\n  ami = \"y\"\n}",
            ),
        );

        assert_eq!(outcome.status, FixStatus::BlockNotFound);
        assert_eq!(read_file(&dir, "main.tf"), original);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "main.tf",
            "resource \"aws_instance\" \"example\" {\n  ami = \"x\"\n}\n",
        );

        let f = fix(
            "main.tf",
            "resource \"aws_instance\" \"example\"",
            "resource \"aws_instance\" \"example\" {\n  ami = \"y\"\n}",
        );

        assert!(apply_fix(dir.path(), &f).status.is_applied());
        let after_first = read_file(&dir, "main.tf");
        assert!(apply_fix(dir.path(), &f).status.is_applied());
        assert_eq!(read_file(&dir, "main.tf"), after_first);
    }

    #[test]
    fn test_two_fixes_same_file_tolerate_line_drift() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "main.tf",
            "resource \"aws_instance\" \"a\" {\n  ami = \"1\"\n}\nresource \"aws_instance\" \"b\" {\n  ami = \"2\"\n}\n",
        );

        // First fix grows its block by two lines, shifting the second block.
        let fixes = [
            fix(
                "main.tf",
                "resource \"aws_instance\" \"a\"",
                "resource \"aws_instance\" \"a\" {\n  ami = \"1\"\n  instance_type = \"t3.micro\"\n  monitoring = true\n}",
            ),
            fix(
                "main.tf",
                "resource \"aws_instance\" \"b\"",
                "resource \"aws_instance\" \"b\" {\n  ami = \"9\"\n}",
            ),
        ];

        let outcomes = apply_fixes(dir.path(), &fixes);
        assert!(outcomes.iter().all(|o| o.status.is_applied()));

        let result = read_file(&dir, "main.tf");
        assert!(result.contains("monitoring = true"));
        assert!(result.contains("ami = \"9\""));
        assert!(!result.contains("ami = \"2\""));
    }

    #[test]
    fn second_fix_relocates_against_patched_file() {
        // Two fixes naming the same block: the second re-locates against
        // the file state the first one produced, so it overwrites the
        // already-patched block. Pins the sequential behavior chosen for
        // overlapping spans.
        let dir = TempDir::new().unwrap();
        write_file(&dir, "main.tf", "locals {\n  a = 1\n}\n");

        let fixes = [
            fix("main.tf", "locals", "locals {\n  a = 2\n}"),
            fix("main.tf", "locals", "locals {\n  a = 3\n}"),
        ];

        let outcomes = apply_fixes(dir.path(), &fixes);
        assert!(outcomes.iter().all(|o| o.status.is_applied()));
        assert_eq!(read_file(&dir, "main.tf"), "locals {\n  a = 3\n}\n");
    }

    #[test]
    fn test_one_failure_does_not_stop_later_fixes() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "b.tf", "module \"net\" {\n  source = \"./net\"\n}\n");

        let fixes = [
            fix("missing.tf", "locals", "locals {\n}"),
            fix(
                "b.tf",
                "module \"net\"",
                "module \"net\" {\n  source = \"./network\"\n}",
            ),
        ];

        let outcomes = apply_fixes(dir.path(), &fixes);
        assert_eq!(outcomes[0].status, FixStatus::FileNotFound);
        assert!(outcomes[1].status.is_applied());
        assert!(read_file(&dir, "b.tf").contains("./network"));
    }

    #[test]
    fn test_missing_final_newline_outside_span_preserved() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "main.tf",
            "locals {\n  a = 1\n}\n# no newline at end",
        );

        let outcome = apply_fix(dir.path(), &fix("main.tf", "locals", "locals {\n  a = 2\n}"));
        assert!(outcome.status.is_applied());
        assert_eq!(
            read_file(&dir, "main.tf"),
            "locals {\n  a = 2\n}\n# no newline at end"
        );
    }
}
