//! Prompt context retrieval
//!
//! Pulls the Terraform source the model needs to reason about a failure.
//! File references are mined straight from the failure log; when the log
//! names nothing, every `*.tf` file in the repo is offered instead.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::util::truncate;

/// Patterns that pull `.tf` file references out of terraform error output.
const FILE_REF_PATTERNS: &[&str] = &[
    r"on ([\w\-/\.]+\.tf) line (\d+)",
    r"in ([\w\-/\.]+\.tf)",
    r"Error.*?([\w\-/\.]+\.tf)",
];

/// One retrieved file, body already truncated to the per-file budget.
#[derive(Debug, Clone)]
pub struct ContextSection {
    pub path: String,
    pub body: String,
}

/// Explicitly constructed retrieval result, owned by the caller for the
/// duration of one run. No process-global store.
#[derive(Debug)]
pub struct ContextStore {
    sections: Vec<ContextSection>,
}

impl ContextStore {
    /// Gather context for a failure log: log-referenced files first, the
    /// whole-repo walk as fallback. Unreadable or missing references are
    /// dropped silently, matching the retrieval contract of being
    /// best-effort.
    pub fn load(root: &Path, log: &str, per_file_budget: usize) -> Self {
        let mut candidates = referenced_files(log);
        if candidates.is_empty() {
            candidates = all_tf_files(root);
        }

        let sections = candidates
            .into_iter()
            .filter_map(|rel| {
                let full = if Path::new(&rel).is_absolute() {
                    PathBuf::from(&rel)
                } else {
                    root.join(&rel)
                };
                fs::read_to_string(&full).ok().map(|content| ContextSection {
                    path: rel,
                    body: truncate(&content, per_file_budget),
                })
            })
            .collect();

        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.sections.len()
    }

    /// Render the sections as fenced blocks for the prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!(
                "\n## File: {}\n```hcl\n{}\n```\n",
                section.path, section.body
            ));
        }
        out
    }
}

/// Extract `.tf` paths named in the log, in order of first appearance.
fn referenced_files(log: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for pattern in FILE_REF_PATTERNS {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };
        for cap in re.captures_iter(log) {
            if let Some(m) = cap.get(1) {
                let path = m.as_str().to_string();
                if !found.iter().any(|(_, p)| *p == path) {
                    found.push((m.start(), path));
                }
            }
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, path)| path).collect()
}

/// All `*.tf` files under the root, as root-relative paths.
fn all_tf_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext == "tf")
                .unwrap_or(false)
        })
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
        .collect();

    files.sort();
    files
}
