//! Implementation of the `lockstep status` command.
//!
//! Shows which branch each repository is on and whether it has uncommitted
//! changes. With an expected branch it doubles as the check for an
//! interrupted switch: repositories left behind are reported and the command
//! fails.

use crate::branch::{BranchName, HeadState};
use crate::branch::refs::read_head;
use crate::cli::StatusArgs;
use crate::context::SessionContext;
use crate::error::{LockstepError, Result};
use crate::git::has_uncommitted_changes;
use std::path::PathBuf;

/// Current state of one repository.
#[derive(Debug, Clone)]
pub struct RepoStatus {
    pub repo: PathBuf,
    pub head: HeadState,
    pub dirty: bool,
}

/// Execute the `lockstep status` command.
pub fn cmd_status(ctx: &SessionContext, args: StatusArgs) -> Result<()> {
    let statuses = run_status(ctx, args.workspace.as_deref())?;

    for status in &statuses {
        let state = if status.dirty { "dirty" } else { "clean" };
        println!("{}\t{}\t{}", status.repo.display(), status.head, state);
    }

    if let Some(expected) = &args.branch {
        ensure_all_on(&statuses, &BranchName::parse(expected)?)?;
    }

    Ok(())
}

/// Collect the status of the main repository and each workspace repository.
pub fn run_status(
    ctx: &SessionContext,
    workspace: Option<&std::path::Path>,
) -> Result<Vec<RepoStatus>> {
    let auxiliary = ctx.load_auxiliary(workspace)?;

    std::iter::once(&ctx.repo)
        .chain(&auxiliary)
        .map(|repo| {
            Ok(RepoStatus {
                repo: repo.path().to_path_buf(),
                head: read_head(repo)?,
                dirty: has_uncommitted_changes(repo)?,
            })
        })
        .collect()
}

/// Fail when any repository is not on `expected`.
pub fn ensure_all_on(statuses: &[RepoStatus], expected: &BranchName) -> Result<()> {
    let behind: Vec<_> = statuses
        .iter()
        .filter(|s| s.head.branch() != Some(expected.as_str()))
        .collect();

    if behind.is_empty() {
        return Ok(());
    }

    let listing: Vec<String> = behind
        .iter()
        .map(|s| format!("  {} (on {})", s.repo.display(), s.head))
        .collect();

    Err(LockstepError::PreconditionError(format!(
        "{} of {} repositories are not on '{}':\n{}\n\n\
         A previous switch may have been interrupted. Run `lockstep switch {}` again \
         or check out the original branches by hand.",
        behind.len(),
        statuses.len(),
        expected,
        listing.join("\n"),
        expected
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{branch, create_test_repo, git, make_dirty};

    #[test]
    fn lists_main_and_workspace_repositories() {
        let main = create_test_repo();
        let aux = create_test_repo();
        make_dirty(aux.path());
        std::fs::write(
            main.path().join(".lockstep-workspace"),
            format!("{}\n", aux.path().display()),
        )
        .unwrap();
        let ctx = SessionContext::resolve_from(main.path()).unwrap();

        let statuses = run_status(&ctx, None).unwrap();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].head, HeadState::Branch("main".to_string()));
        assert!(!statuses[0].dirty);
        assert!(statuses[1].dirty);
    }

    #[test]
    fn detects_repositories_left_on_another_branch() {
        let main = create_test_repo();
        let aux = create_test_repo();
        git(main.path(), &["checkout", "--quiet", "-b", "feature/x"]);
        std::fs::write(
            main.path().join(".lockstep-workspace"),
            format!("{}\n", aux.path().display()),
        )
        .unwrap();
        let ctx = SessionContext::resolve_from(main.path()).unwrap();
        let statuses = run_status(&ctx, None).unwrap();

        let err = ensure_all_on(&statuses, &branch("feature/x")).unwrap_err();

        assert!(matches!(err, LockstepError::PreconditionError(_)));
        let message = err.to_string();
        assert!(message.starts_with("1 of 2 repositories are not on 'feature/x'"));
        assert!(message.contains("(on main)"));

        git(aux.path(), &["checkout", "--quiet", "-b", "feature/x"]);
        let statuses = run_status(&ctx, None).unwrap();
        assert!(ensure_all_on(&statuses, &branch("feature/x")).is_ok());
    }
}
