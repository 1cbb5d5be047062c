//! Implementation of the `lockstep check` command.

use crate::branch::BranchName;
use crate::cli::CheckArgs;
use crate::context::SessionContext;
use crate::error::Result;

/// Execute the `lockstep check` command.
///
/// Prints the name on stdout when it may be used as a work branch.
pub fn cmd_check(ctx: &SessionContext, args: CheckArgs) -> Result<()> {
    let name = run_check(ctx, &args.branch)?;
    println!("{}", name);
    Ok(())
}

/// Validate `branch` against the format rules and the main repository's
/// protected branches.
pub fn run_check(ctx: &SessionContext, branch: &str) -> Result<BranchName> {
    Ok(ctx.engine().validate(branch, &ctx.repo)?)
}
