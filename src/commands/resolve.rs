//! Implementation of the `lockstep resolve` command.
//!
//! Reports where a branch exists in the main repository and each workspace
//! repository. Fetches as needed but never switches branches.

use crate::branch::{BranchName, ExistenceReport, FetchOutcome};
use crate::cli::ResolveArgs;
use crate::context::SessionContext;
use crate::error::Result;
use std::path::PathBuf;

/// Resolution result for one repository.
#[derive(Debug, Clone)]
pub struct ResolveRow {
    pub repo: PathBuf,
    pub report: ExistenceReport,
}

/// Execute the `lockstep resolve` command.
pub fn cmd_resolve(ctx: &SessionContext, args: ResolveArgs) -> Result<()> {
    let rows = run_resolve(ctx, &args)?;

    for row in &rows {
        let note = match &row.report.fetch {
            FetchOutcome::Failed(_) => " (fetch failed; remote refs may be stale)",
            FetchOutcome::NotAttempted | FetchOutcome::Fetched => "",
        };
        println!("{}\t{}{}", row.repo.display(), row.report.state, note);
    }

    Ok(())
}

/// Resolve `args.branch` in the main repository, then each workspace repository.
pub fn run_resolve(ctx: &SessionContext, args: &ResolveArgs) -> Result<Vec<ResolveRow>> {
    let name = BranchName::parse(&args.branch)?;
    let auxiliary = ctx.load_auxiliary(args.workspace.as_deref())?;
    let engine = ctx.engine();

    std::iter::once(&ctx.repo)
        .chain(&auxiliary)
        .map(|repo| {
            Ok(ResolveRow {
                repo: repo.path().to_path_buf(),
                report: engine.resolve(repo, &name)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::BranchExistence;
    use crate::test_support::{create_clone, create_test_repo, git};

    #[test]
    fn reports_each_repository() {
        let upstream = create_test_repo();
        git(upstream.path(), &["branch", "feature/x"]);
        let main = create_test_repo();
        git(main.path(), &["branch", "feature/x"]);
        let aux = create_clone(upstream.path());
        let other = create_test_repo();
        let workspace = main.path().join("ws.txt");
        std::fs::write(
            &workspace,
            format!("{}\n{}\n", aux.path().display(), other.path().display()),
        )
        .unwrap();
        let ctx = SessionContext::resolve_from(main.path()).unwrap();

        let rows = run_resolve(
            &ctx,
            &ResolveArgs {
                branch: "feature/x".to_string(),
                workspace: Some(workspace),
            },
        )
        .unwrap();

        let states: Vec<_> = rows.iter().map(|r| r.report.state.clone()).collect();
        assert_eq!(
            states,
            vec![
                BranchExistence::Local,
                BranchExistence::Remote {
                    reference: "origin/feature/x".to_string()
                },
                BranchExistence::Absent,
            ]
        );
        assert_eq!(rows[0].report.fetch, FetchOutcome::NotAttempted);
        // no origin configured
        assert!(matches!(rows[2].report.fetch, FetchOutcome::Failed(_)));
    }

    #[test]
    fn protected_names_can_still_be_resolved() {
        let repo = create_test_repo();
        let ctx = SessionContext::resolve_from(repo.path()).unwrap();

        let rows = run_resolve(
            &ctx,
            &ResolveArgs {
                branch: "main".to_string(),
                workspace: None,
            },
        )
        .unwrap();

        assert_eq!(rows[0].report.state, BranchExistence::Local);
    }
}
