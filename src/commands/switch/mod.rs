//! Implementation of the `lockstep switch` command.
//!
//! Puts the main repository and every workspace repository on one branch:
//!
//! 1. Pick the branch: the given name (validated) or a generated
//!    `<assistant>-<timestamp>` name, which always implies `--create`
//! 2. Load the workspace file
//! 3. With `--dry-run`, print the plan and stop
//! 4. Otherwise sync, printing the branch name (or a JSON report) on stdout
//!
//! A failed workspace sync has already been rolled back when the error
//! reaches the caller.

use crate::branch::BranchName;
use crate::cli::SwitchArgs;
use crate::context::SessionContext;
use crate::error::{LockstepError, Result};
use crate::sync::{PlannedStep, SyncReport, SyncRequest, plan, sync};
use serde_json::json;

/// What `switch` did.
#[derive(Debug)]
pub enum SwitchResult {
    /// Every repository is on the branch.
    Synced(SyncReport),
    /// Dry run: nothing was switched.
    Planned {
        branch: BranchName,
        steps: Vec<PlannedStep>,
    },
}

/// Execute the `lockstep switch` command.
pub fn cmd_switch(ctx: &SessionContext, args: SwitchArgs) -> Result<()> {
    let json_output = args.json;

    match run_switch(ctx, &args)? {
        SwitchResult::Synced(report) => {
            if json_output {
                print_json(&json!({
                    "branch": report.branch,
                    "repositories": report.repositories,
                }))?;
            } else {
                for entry in &report.repositories {
                    eprintln!("{}: {}", entry.repo.display(), entry.outcome.describe());
                }
                println!("{}", report.branch);
            }
        }
        SwitchResult::Planned { branch, steps } => {
            if json_output {
                print_json(&json!({
                    "branch": branch,
                    "dry_run": true,
                    "steps": steps,
                }))?;
            } else {
                println!("Dry run for '{}':", branch);
                for step in &steps {
                    let dirty = if step.dirty { ", dirty" } else { "" };
                    println!(
                        "  {} (on {}{}): {}",
                        step.repo.display(),
                        step.head,
                        dirty,
                        step.action
                    );
                }
            }
        }
    }

    Ok(())
}

/// Switch (or plan switching) every repository onto the requested branch.
pub fn run_switch(ctx: &SessionContext, args: &SwitchArgs) -> Result<SwitchResult> {
    let engine = ctx.engine();

    let (branch, create) = match &args.branch {
        Some(raw) => (engine.validate(raw, &ctx.repo)?, args.create),
        None => {
            let assistant = args.assistant.as_deref().unwrap_or(&ctx.config.assistant);
            let generated = BranchName::generate(assistant).map_err(|e| {
                LockstepError::UserError(format!(
                    "cannot generate a branch name from assistant '{}': {}",
                    assistant, e
                ))
            })?;
            tracing::debug!(branch = %generated, "generated branch name");
            (generated, true)
        }
    };

    let auxiliary = ctx.load_auxiliary(args.workspace.as_deref())?;
    let base = args.base.as_deref().or(ctx.config.base_branch.as_deref());

    let request = SyncRequest {
        main: &ctx.repo,
        auxiliary: &auxiliary,
        branch: &branch,
        base,
        create_if_missing: create,
    };

    if args.dry_run {
        let steps = plan(&engine, &request)?;
        return Ok(SwitchResult::Planned { branch, steps });
    }

    Ok(SwitchResult::Synced(sync(&engine, &request)?))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| LockstepError::UserError(format!("failed to render JSON: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
