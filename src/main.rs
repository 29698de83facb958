use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use terrafix::config::{self, Config};
use terrafix::llm::{self, Model};
use terrafix::patch;
use terrafix::prompt;
use terrafix::publish::{self, PublishOutcome};
use terrafix::remediation;
use terrafix::report;
use terrafix::retrieval::ContextStore;

#[derive(Parser, Debug)]
#[command(
    name = "terrafix",
    about = "AI-assisted remediation for failed Terraform runs",
    version
)]
struct Args {
    /// Path to the repository (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to the terraform failure log, relative to the repository
    #[arg(short, long, default_value = "logs/terraform.log")]
    log: PathBuf,

    /// Branch the fix commit is force-pushed to
    #[arg(short, long)]
    branch: Option<String>,

    /// Model id override for the analysis call
    #[arg(short, long)]
    model: Option<String>,

    /// Parse and report fixes without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Apply fixes but skip the branch/commit/push step
    #[arg(long)]
    no_publish: bool,

    /// Store an OpenAI API key in the local config file
    #[arg(long)]
    setup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.setup {
        if let Err(e) = config::setup_api_key_interactive() {
            eprintln!("Setup failed: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let root = args.path.canonicalize()?;
    let config = Config::load();

    let branch = args.branch.unwrap_or_else(|| config.fix_branch.clone());
    let model_override = args.model.or_else(|| config.model.clone());

    let log_path = root.join(&args.log);
    let log_content = match fs::read_to_string(&log_path) {
        Ok(content) if !content.trim().is_empty() => content,
        _ => {
            eprintln!("No Terraform logs found at {}. Exiting.", log_path.display());
            return Ok(());
        }
    };

    if !llm::is_available() {
        eprintln!("No API key configured. Set OPENAI_API_KEY to enable remediation.");
        std::process::exit(1);
    }

    eprintln!("Retrieving relevant context from Terraform files...");
    let context = ContextStore::load(&root, &log_content, config.context_budget);
    eprintln!("  {} file(s) in context", context.file_count());

    eprintln!(
        "Requesting remediation from {}...",
        model_override.as_deref().unwrap_or(Model::Analysis.name())
    );
    let user_prompt = prompt::build_remediation_prompt(&log_content, &context.render());
    let ai_response = llm::call_llm(
        prompt::SYSTEM_PROMPT,
        &user_prompt,
        Model::Analysis,
        model_override.as_deref(),
    )
    .await?;

    println!("AI Suggestions:\n");
    println!("{}", ai_response);

    let fixes = remediation::extract_fixes(&ai_response);
    if fixes.is_empty() {
        eprintln!("No structured fixes found in the response. Nothing to apply.");
        report::write_step_summary(&report::render_summary(&ai_response, &[], None))?;
        return Ok(());
    }

    if args.dry_run {
        eprintln!("Dry run: {} fix(es) parsed, none applied.", fixes.len());
        for fix in &fixes {
            eprintln!("  - {} ({})", fix.file, fix.block_name);
        }
        return Ok(());
    }

    eprintln!("Applying {} fix(es)...", fixes.len());
    let outcomes = patch::apply_fixes(&root, &fixes);
    report::print_status(&outcomes);

    let changed_files: Vec<String> = outcomes
        .iter()
        .filter(|o| o.status.is_applied())
        .map(|o| o.file.clone())
        .collect();

    let mut pushed_branch = None;
    if !changed_files.is_empty() && !args.no_publish {
        eprintln!("Publishing to branch '{}'...", branch);
        match publish::publish(&root, &changed_files, &branch)? {
            PublishOutcome::Pushed { branch, commit } => {
                eprintln!("  Pushed {} ({})", branch, &commit[..8.min(commit.len())]);
                pushed_branch = Some(branch);
            }
            PublishOutcome::NothingToCommit => {
                eprintln!("  No changes to commit. Skipping push.");
            }
        }
    }

    report::write_step_summary(&report::render_summary(
        &ai_response,
        &outcomes,
        pushed_branch.as_deref(),
    ))?;

    Ok(())
}
