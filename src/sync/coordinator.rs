//! Workspace synchronization: move the main repository and every auxiliary
//! repository onto one branch, or leave all of them where they started.

use super::ledger::{RollbackReport, SyncLedger};
use crate::branch::refs::read_head;
use crate::branch::{
    ApplyOutcome, BranchEngine, BranchExistence, BranchName, HeadState, RemoteFetcher,
};
use crate::error::{LockstepError, Result};
use crate::git::{ensure_clean_worktree, has_commits, has_uncommitted_changes};
use crate::workspace::{RepositoryHandle, check_workspace};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Inputs for one synchronization attempt.
#[derive(Debug, Clone, Copy)]
pub struct SyncRequest<'a> {
    pub main: &'a RepositoryHandle,
    /// Auxiliary repositories, processed in this order.
    pub auxiliary: &'a [RepositoryHandle],
    pub branch: &'a BranchName,
    /// Start point for a branch created in the main repository.
    pub base: Option<&'a str>,
    pub create_if_missing: bool,
}

/// How one repository reached the target branch.
#[derive(Debug, Clone, Serialize)]
pub struct RepoOutcome {
    pub repo: PathBuf,
    pub outcome: ApplyOutcome,
}

/// A completed synchronization.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// The branch now checked out in every repository.
    pub branch: BranchName,
    /// Main repository first, then auxiliaries in order.
    pub repositories: Vec<RepoOutcome>,
    /// Present for multi-repository syncs so the caller can still undo them.
    #[serde(skip)]
    pub ledger: Option<SyncLedger>,
}

/// A failed multi-repository sync and what its rollback did.
#[derive(Debug)]
pub struct SyncFailure {
    pub branch: BranchName,
    pub failed_repo: PathBuf,
    pub cause: LockstepError,
    pub rollback: RollbackReport,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "workspace sync to '{}' failed in '{}':\n{}",
            self.branch,
            self.failed_repo.display(),
            self.cause
        )?;

        writeln!(f)?;
        if self.rollback.restored.is_empty() && self.rollback.errors.is_empty() {
            write!(f, "No repository had been switched; nothing was rolled back.")?;
            return Ok(());
        }

        writeln!(f, "Rolled back to the original branches:")?;
        for repo in &self.rollback.restored {
            writeln!(f, "  {}", repo.display())?;
        }
        if !self.rollback.deleted.is_empty() {
            writeln!(f, "Deleted the newly created '{}' from:", self.branch)?;
            for repo in &self.rollback.deleted {
                writeln!(f, "  {}", repo.display())?;
            }
        }
        if !self.rollback.preserved.is_empty() {
            writeln!(f, "Kept the pre-existing '{}' in:", self.branch)?;
            for repo in &self.rollback.preserved {
                writeln!(f, "  {}", repo.display())?;
            }
        }

        if self.rollback.is_clean() {
            write!(f, "All repositories are back on their starting branches.")
        } else {
            writeln!(f, "\nRollback also had problems; manual cleanup is required:")?;
            for error in &self.rollback.errors {
                writeln!(f, "  {}", error)?;
            }
            Ok(())
        }
    }
}

/// Move the main and auxiliary repositories onto `request.branch`.
///
/// 1. The name is checked against every repository's protected set.
/// 2. With no auxiliary repositories the main repository is switched directly.
/// 3. Otherwise every HEAD is captured, the main repository is switched, and
///    each auxiliary repository (which must be clean) follows in order.
/// 4. The first auxiliary failure rolls back everything done so far and
///    returns [`LockstepError::SyncFailed`]; remaining repositories are not
///    attempted.
pub fn sync<F: RemoteFetcher>(
    engine: &BranchEngine<F>,
    request: &SyncRequest<'_>,
) -> Result<SyncReport> {
    let SyncRequest {
        main,
        auxiliary,
        branch,
        base,
        create_if_missing,
    } = *request;

    for repo in std::iter::once(main).chain(auxiliary) {
        engine.ensure_not_protected(branch, repo)?;
    }

    if auxiliary.is_empty() {
        let outcome = engine.apply(main, branch, base, create_if_missing)?;
        return Ok(SyncReport {
            branch: branch.clone(),
            repositories: vec![RepoOutcome {
                repo: main.path().to_path_buf(),
                outcome,
            }],
            ledger: None,
        });
    }

    check_workspace(main, auxiliary)?;

    let mut ledger = SyncLedger::capture_all(main, auxiliary, branch)?;
    let mut repositories = Vec::with_capacity(auxiliary.len() + 1);

    // A failure here mutated nothing, so it is returned as-is.
    let outcome = engine.apply(main, branch, base, create_if_missing)?;
    ledger.record_success(main, outcome.created_branch());
    repositories.push(RepoOutcome {
        repo: main.path().to_path_buf(),
        outcome,
    });

    for repo in auxiliary {
        let result = ensure_clean_worktree(repo)
            .and_then(|()| engine.apply(repo, branch, None, create_if_missing));

        match result {
            Ok(outcome) => {
                ledger.record_success(repo, outcome.created_branch());
                repositories.push(RepoOutcome {
                    repo: repo.path().to_path_buf(),
                    outcome,
                });
            }
            Err(cause) => {
                tracing::warn!(repo = %repo, error = %cause, "workspace repository failed, rolling back");
                let rollback = ledger.rollback_all();
                return Err(LockstepError::SyncFailed(Box::new(SyncFailure {
                    branch: branch.clone(),
                    failed_repo: repo.path().to_path_buf(),
                    cause,
                    rollback,
                })));
            }
        }
    }

    tracing::info!(branch = %branch, repositories = repositories.len(), "workspace synchronized");
    Ok(SyncReport {
        branch: branch.clone(),
        repositories,
        ledger: Some(ledger),
    })
}

/// What `sync` would do in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    Switch,
    Track { reference: String },
    Create { from: String },
    Blocked { reason: String },
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::Switch => f.write_str("switch to existing branch"),
            PlannedAction::Track { reference } => write!(f, "track {}", reference),
            PlannedAction::Create { from } => write!(f, "create from {}", from),
            PlannedAction::Blocked { reason } => write!(f, "blocked: {}", reason),
        }
    }
}

/// Dry-run view of one repository.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub repo: PathBuf,
    pub head: HeadState,
    pub dirty: bool,
    pub existence: BranchExistence,
    pub action: PlannedAction,
}

/// Describe what `sync` would do without switching any repository.
///
/// Resolution may still fetch from the remote.
pub fn plan<F: RemoteFetcher>(
    engine: &BranchEngine<F>,
    request: &SyncRequest<'_>,
) -> Result<Vec<PlannedStep>> {
    let SyncRequest {
        main,
        auxiliary,
        branch,
        base,
        create_if_missing,
    } = *request;

    for repo in std::iter::once(main).chain(auxiliary) {
        engine.ensure_not_protected(branch, repo)?;
    }
    check_workspace(main, auxiliary)?;

    let mut steps = Vec::with_capacity(auxiliary.len() + 1);
    for (index, repo) in std::iter::once(main).chain(auxiliary).enumerate() {
        let is_main = index == 0;
        let head = read_head(repo)?;
        let dirty = has_uncommitted_changes(repo)?;
        let existence = engine.resolve(repo, branch)?.state;

        let action = if dirty && !is_main {
            PlannedAction::Blocked {
                reason: "uncommitted changes".to_string(),
            }
        } else {
            match &existence {
                BranchExistence::Local => PlannedAction::Switch,
                BranchExistence::Remote { reference } => PlannedAction::Track {
                    reference: reference.clone(),
                },
                BranchExistence::Absent if !create_if_missing => PlannedAction::Blocked {
                    reason: "branch not found (use --create)".to_string(),
                },
                BranchExistence::Absent if !has_commits(repo) => PlannedAction::Blocked {
                    reason: "repository has no commits".to_string(),
                },
                BranchExistence::Absent => PlannedAction::Create {
                    from: match base {
                        Some(base) if is_main => base.to_string(),
                        _ => head.to_string(),
                    },
                },
            }
        };

        steps.push(PlannedStep {
            repo: repo.path().to_path_buf(),
            head,
            dirty,
            existence,
            action,
        });
    }

    Ok(steps)
}
