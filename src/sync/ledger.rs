//! Rollback bookkeeping for one synchronization attempt.
//!
//! The ledger is created by capturing every repository's HEAD before the
//! first mutation. It then records, in processing order, each repository
//! that reached the target branch and whether the branch was created there.
//! Rollback walks that log in reverse and only deletes branches the attempt
//! itself created.

use crate::branch::refs::{checkout_head, delete_branch, read_head};
use crate::branch::{BranchName, HeadState};
use crate::error::{LockstepError, Result};
use crate::workspace::RepositoryHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Each participating repository's HEAD before any mutation.
#[derive(Debug, Clone, Default)]
pub struct OriginalBranchRecord {
    heads: BTreeMap<PathBuf, HeadState>,
}

impl OriginalBranchRecord {
    pub fn get(&self, repo: &Path) -> Option<&HeadState> {
        self.heads.get(repo)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &HeadState)> {
        self.heads.iter().map(|(p, h)| (p.as_path(), h))
    }
}

/// Rollback step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStep {
    Checkout,
    DeleteBranch,
}

/// A rollback step that failed in one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackError {
    pub repo: PathBuf,
    pub step: RollbackStep,
    pub message: String,
}

impl fmt::Display for RollbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self.step {
            RollbackStep::Checkout => "restore original branch",
            RollbackStep::DeleteBranch => "delete created branch",
        };
        write!(f, "{}: could not {}: {}", self.repo.display(), step, self.message)
    }
}

/// What rollback did, repository by repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollbackReport {
    /// Repositories returned to their original HEAD, in rollback order.
    pub restored: Vec<PathBuf>,
    /// Repositories the created target branch was deleted from.
    pub deleted: Vec<PathBuf>,
    /// Repositories where the target branch pre-existed and was left intact.
    pub preserved: Vec<PathBuf>,
    pub errors: Vec<RollbackError>,
}

impl RollbackReport {
    /// True when every rollback step succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Bookkeeping for one synchronization attempt.
///
/// Owned by the coordinator for the duration of the attempt and passed by
/// reference; nothing here outlives the invocation.
#[derive(Debug)]
pub struct SyncLedger {
    target: BranchName,
    originals: OriginalBranchRecord,
    created: BTreeMap<PathBuf, bool>,
    completed: Vec<PathBuf>,
}

impl SyncLedger {
    /// Capture the HEAD of `main` and every auxiliary repository.
    ///
    /// Must run before the first mutation of the attempt.
    pub fn capture_all(
        main: &RepositoryHandle,
        auxiliary: &[RepositoryHandle],
        target: &BranchName,
    ) -> Result<Self> {
        let mut heads = BTreeMap::new();

        for repo in std::iter::once(main).chain(auxiliary) {
            let head = read_head(repo).map_err(|e| {
                LockstepError::PreconditionError(format!(
                    "cannot record the current branch of '{}': {}",
                    repo, e
                ))
            })?;
            tracing::debug!(repo = %repo, head = %head, "captured original head");
            heads.insert(repo.path().to_path_buf(), head);
        }

        Ok(Self {
            target: target.clone(),
            originals: OriginalBranchRecord { heads },
            created: BTreeMap::new(),
            completed: Vec::new(),
        })
    }

    /// Record that `repo` is now on the target branch.
    pub fn record_success(&mut self, repo: &RepositoryHandle, created: bool) {
        self.created.insert(repo.path().to_path_buf(), created);
        self.completed.push(repo.path().to_path_buf());
    }

    pub fn target(&self) -> &BranchName {
        &self.target
    }

    pub fn originals(&self) -> &OriginalBranchRecord {
        &self.originals
    }

    /// Repositories on the target branch so far, in processing order.
    pub fn completed(&self) -> &[PathBuf] {
        &self.completed
    }

    /// True if the attempt created the target branch in `repo`.
    pub fn was_created(&self, repo: &Path) -> bool {
        self.created.get(repo).copied().unwrap_or(false)
    }

    /// Undo the attempt, most recent repository first.
    ///
    /// Every completed repository is returned to its captured HEAD and the
    /// target branch is deleted only where this attempt created it. A failed
    /// step is recorded and rollback continues with the next repository.
    pub fn rollback_all(self) -> RollbackReport {
        let mut report = RollbackReport::default();
        let target = self.target.as_str();

        for repo in self.completed.iter().rev() {
            let Some(original) = self.originals.get(repo) else {
                report.errors.push(RollbackError {
                    repo: repo.clone(),
                    step: RollbackStep::Checkout,
                    message: "no original branch was recorded".to_string(),
                });
                continue;
            };

            warn_if_moved(repo, target);

            match checkout_head(repo, original) {
                Ok(()) => report.restored.push(repo.clone()),
                Err(e) => {
                    tracing::warn!(repo = %repo.display(), error = %e, "rollback checkout failed");
                    report.errors.push(RollbackError {
                        repo: repo.clone(),
                        step: RollbackStep::Checkout,
                        message: e.to_string(),
                    });
                }
            }

            if !self.was_created(repo) {
                report.preserved.push(repo.clone());
                continue;
            }

            match delete_branch(repo, target, true) {
                Ok(()) => report.deleted.push(repo.clone()),
                Err(e) => {
                    tracing::warn!(repo = %repo.display(), error = %e, "rollback branch delete failed");
                    report.errors.push(RollbackError {
                        repo: repo.clone(),
                        step: RollbackStep::DeleteBranch,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            target = %target,
            restored = report.restored.len(),
            deleted = report.deleted.len(),
            errors = report.errors.len(),
            "rollback finished"
        );
        report
    }
}

/// Log when a repository is no longer on the branch this attempt put it on.
///
/// Rollback still restores it; no locking prevents outside changes.
fn warn_if_moved(repo: &Path, target: &str) {
    match read_head(repo) {
        Ok(head) if head.branch() == Some(target) => {}
        Ok(head) => tracing::warn!(
            repo = %repo.display(),
            expected = target,
            actual = %head,
            "repository moved away from the target branch during the attempt"
        ),
        Err(e) => tracing::warn!(repo = %repo.display(), error = %e, "cannot read HEAD before rollback"),
    }
}
