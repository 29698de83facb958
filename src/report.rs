//! Run reporting
//!
//! Per-fix status lines on stderr plus the Markdown summary GitHub Actions
//! picks up from $GITHUB_STEP_SUMMARY.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::patch::{FixOutcome, FixStatus};

/// Print one status line per fix.
pub fn print_status(outcomes: &[FixOutcome]) {
    for outcome in outcomes {
        let marker = if outcome.status.is_applied() { "+" } else { "!" };
        match &outcome.status {
            FixStatus::Applied { span } => eprintln!(
                "  {} {} ({}) lines {}-{}",
                marker, outcome.file, outcome.block_name, span.start, span.end
            ),
            status => eprintln!(
                "  {} {} ({}): {}",
                marker,
                outcome.file,
                outcome.block_name,
                status.label()
            ),
        }
    }
}

/// Render the Markdown run summary: raw suggestions first, then the per-fix
/// outcome table, then the review pointer when a branch was pushed.
pub fn render_summary(
    ai_response: &str,
    outcomes: &[FixOutcome],
    pushed_branch: Option<&str>,
) -> String {
    let mut md = String::new();

    md.push_str("### AI Suggestions\n\n");
    md.push_str(ai_response);
    md.push_str("\n\n");

    if !outcomes.is_empty() {
        md.push_str("### Applied fixes\n\n");
        md.push_str("| File | Block | Outcome |\n|---|---|---|\n");
        for outcome in outcomes {
            md.push_str(&format!(
                "| `{}` | `{}` | {} |\n",
                outcome.file,
                outcome.block_name,
                outcome.status.label()
            ));
        }
        md.push('\n');
    }

    if let Some(branch) = pushed_branch {
        md.push_str(&format!(
            "> Auto-fix applied. Pull the '{}' branch and review the code locally.\n",
            branch
        ));
    }

    md
}

/// Append the summary to the step summary file when running under Actions.
pub fn write_step_summary(markdown: &str) -> Result<()> {
    match std::env::var("GITHUB_STEP_SUMMARY") {
        Ok(path) if !path.is_empty() => append_summary(Path::new(&path), markdown),
        _ => Ok(()),
    }
}

fn append_summary(path: &Path, markdown: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open step summary file")?;
    file.write_all(markdown.as_bytes())
        .context("Failed to write step summary")?;
    Ok(())
}
