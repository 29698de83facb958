//! Publication of applied fixes
//!
//! Narrow interface over version control: put the patched files on a fix
//! branch and force-push it. Branch and commit go through git2; fetch,
//! remote branch deletion, and push shell out to `git` so the ambient
//! credential setup of the CI runner is used.
//!
//! Nothing in here feeds back into the patch engine.

use anyhow::{Context, Result};
use git2::{Repository, Signature};
use std::path::Path;
use std::process::Command;

/// Result of a publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed { branch: String, commit: String },
    NothingToCommit,
}

const BOT_NAME: &str = "terraform-bot";
const BOT_EMAIL: &str = "bot@example.com";
const COMMIT_MESSAGE: &str = "Apply suggested Terraform block fixes";

/// Publish changed files to `branch`: reset the remote branch if it exists,
/// commit the changes on a local branch of the same name, and force-push.
pub fn publish(repo_root: &Path, changed_files: &[String], branch: &str) -> Result<PublishOutcome> {
    setup_remote(repo_root);

    // Best-effort: a missing remote just means the push will fail loudly.
    let _ = git(repo_root, &["fetch", "origin"]);

    if remote_branch_exists(repo_root, branch) {
        eprintln!("  Remote branch '{}' exists. Deleting it...", branch);
        git(repo_root, &["push", "origin", "--delete", branch])
            .context("Failed to delete existing remote branch")?;
    }

    checkout_fix_branch(repo_root, branch)?;
    stage_files(repo_root, changed_files)?;

    let commit = match commit_staged(repo_root, COMMIT_MESSAGE)? {
        Some(oid) => oid,
        None => return Ok(PublishOutcome::NothingToCommit),
    };

    force_push(repo_root, branch)?;

    Ok(PublishOutcome::Pushed {
        branch: branch.to_string(),
        commit,
    })
}

/// Point origin at a token-authenticated URL when running under Actions.
fn setup_remote(repo_root: &Path) {
    let token = std::env::var("GITHUB_TOKEN").ok();
    let repo = std::env::var("GITHUB_REPOSITORY").ok();
    if let (Some(token), Some(repo)) = (token, repo) {
        let remote_url = format!("https://x-access-token:{}@github.com/{}.git", token, repo);
        let _ = git_quiet(repo_root, &["remote", "set-url", "origin", &remote_url]);
    }
}

fn remote_branch_exists(repo_root: &Path, branch: &str) -> bool {
    git_quiet(
        repo_root,
        &["ls-remote", "--exit-code", "--heads", "origin", branch],
    )
    .unwrap_or(false)
}

/// Create (or reset) the fix branch at current HEAD and check it out.
pub fn checkout_fix_branch(repo_root: &Path, name: &str) -> Result<()> {
    let repo = Repository::open(repo_root)?;
    let head = repo.head().context("Failed to get HEAD")?;
    let commit = head.peel_to_commit()?;

    // Already on the branch means it already points at HEAD; libgit2
    // refuses to force-update a checked-out branch.
    if head.shorthand() == Some(name) {
        return Ok(());
    }

    let branch = repo
        .branch(name, &commit, true)
        .context(format!("Failed to create branch '{}'", name))?;

    let refname = branch
        .get()
        .name()
        .context("Branch reference has no name")?
        .to_string();

    // The branch points at the commit HEAD already references, so moving
    // HEAD is enough. No tree checkout: the working tree holds the
    // just-applied fixes and must not be reset.
    repo.set_head(&refname)?;

    Ok(())
}

/// Stage the given repo-relative paths; with an empty list, stage nothing.
pub fn stage_files(repo_root: &Path, files: &[String]) -> Result<()> {
    let repo = Repository::open(repo_root)?;
    let mut index = repo.index()?;

    for file in files {
        index
            .add_path(Path::new(file))
            .context(format!("Failed to stage '{}'", file))?;
    }
    index.write()?;

    Ok(())
}

/// Commit staged changes. Returns `None` when the staged tree is identical
/// to HEAD's, i.e. there is nothing to commit.
pub fn commit_staged(repo_root: &Path, message: &str) -> Result<Option<String>> {
    let repo = Repository::open(repo_root)?;
    let mut index = repo.index()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let head = repo.head()?;
    let parent = head.peel_to_commit()?;

    if parent.tree_id() == tree_id {
        return Ok(None);
    }

    // Bot identity; fall back to repo config when set.
    let config = repo.config()?;
    let name = config
        .get_string("user.name")
        .unwrap_or_else(|_| BOT_NAME.to_string());
    let email = config
        .get_string("user.email")
        .unwrap_or_else(|_| BOT_EMAIL.to_string());

    let sig = Signature::now(&name, &email)?;

    let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

    Ok(Some(oid.to_string()))
}

fn force_push(repo_root: &Path, branch: &str) -> Result<()> {
    git(repo_root, &["push", "-f", "-u", "origin", branch]).context("git push failed")?;
    Ok(())
}

/// Run git and surface stderr on failure.
fn git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(repo_root)
        .args(args)
        .output()
        .context("Failed to execute git")?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(anyhow::anyhow!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr)
        ))
    }
}

/// Run git for existence-style checks where failure is an answer.
fn git_quiet(repo_root: &Path, args: &[&str]) -> Result<bool> {
    let output = Command::new("git")
        .current_dir(repo_root)
        .args(args)
        .output()
        .context("Failed to execute git")?;
    Ok(output.status.success())
}
