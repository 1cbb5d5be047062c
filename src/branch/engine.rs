//! Single-repository branch engine.
//!
//! Drives one repository onto a work branch: switch to it when it exists
//! locally, track it when only the remote has it, create it when allowed.

use super::name::{BranchName, BranchNameError};
use super::protected::ProtectedBranchSet;
use super::refs::{
    checkout_branch, create_and_checkout, create_tracking_branch, list_local_branches,
    list_remote_branches,
};
use super::resolver::{BranchExistence, ExistenceReport, GitFetcher, RemoteFetcher, resolve};
use super::validator::{ensure_not_protected, validate};
use crate::error::{LockstepError, Result};
use crate::git::has_commits;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Branches listed in not-found guidance before truncating.
const GUIDANCE_BRANCH_LIMIT: usize = 20;

/// How a repository ended up on the work branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// An existing local branch was checked out.
    Switched,
    /// A new branch was created and checked out.
    Created,
    /// A local branch was created tracking an existing remote branch.
    TrackedFromRemote,
}

impl ApplyOutcome {
    /// True when the local branch did not exist before this call.
    ///
    /// Rollback deletes the branch only in repositories where this is true.
    pub fn created_branch(self) -> bool {
        match self {
            ApplyOutcome::Switched => false,
            ApplyOutcome::Created | ApplyOutcome::TrackedFromRemote => true,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ApplyOutcome::Switched => "switched to existing branch",
            ApplyOutcome::Created => "created branch",
            ApplyOutcome::TrackedFromRemote => "created tracking branch",
        }
    }
}

/// Branch operations bound to a remote name, protection list and fetcher.
pub struct BranchEngine<F = GitFetcher> {
    remote: String,
    extra_protected: Vec<String>,
    fetcher: F,
}

impl BranchEngine<GitFetcher> {
    /// An engine that fetches from `remote` with `git fetch` under `fetch_timeout`.
    pub fn new(remote: &str, extra_protected: Vec<String>, fetch_timeout: Duration) -> Self {
        Self::with_fetcher(remote, extra_protected, GitFetcher::new(fetch_timeout))
    }
}

impl<F: RemoteFetcher> BranchEngine<F> {
    pub fn with_fetcher(remote: &str, extra_protected: Vec<String>, fetcher: F) -> Self {
        Self {
            remote: remote.to_string(),
            extra_protected,
            fetcher,
        }
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Validate a raw name against the format rules and `repo`'s protected set.
    pub fn validate<P: AsRef<Path>>(
        &self,
        name: &str,
        repo: P,
    ) -> std::result::Result<BranchName, BranchNameError> {
        validate(name, repo, &self.remote, &self.extra_protected)
    }

    /// Check an already parsed name against `repo`'s protected set.
    pub fn ensure_not_protected<P: AsRef<Path>>(
        &self,
        name: &BranchName,
        repo: P,
    ) -> std::result::Result<(), BranchNameError> {
        let protected = ProtectedBranchSet::detect(repo, &self.remote, &self.extra_protected);
        ensure_not_protected(name, &protected)
    }

    /// Resolve whether `name` exists locally, remotely or nowhere in `repo`.
    pub fn resolve<P: AsRef<Path>>(&self, repo: P, name: &BranchName) -> Result<ExistenceReport> {
        resolve(repo, name, &self.remote, &self.fetcher)
    }

    /// Put `repo` on `name`.
    ///
    /// * `Local` - check out the existing branch, regardless of `create_if_missing`.
    /// * `Remote` - create a local branch tracking the remote ref.
    /// * `Absent` with `create_if_missing` - create from `base` (or HEAD).
    /// * `Absent` without it - `BranchNotFound` listing the available branches.
    ///
    /// Performs exactly one checkout or branch-creation command.
    pub fn apply<P: AsRef<Path>>(
        &self,
        repo: P,
        name: &BranchName,
        base: Option<&str>,
        create_if_missing: bool,
    ) -> Result<ApplyOutcome> {
        let repo = repo.as_ref();
        let report = self.resolve(repo, name)?;

        let outcome = match report.state {
            BranchExistence::Local => {
                checkout_branch(repo, name.as_str())?;
                ApplyOutcome::Switched
            }
            BranchExistence::Remote { reference } => {
                create_tracking_branch(repo, name.as_str(), &reference)?;
                ApplyOutcome::TrackedFromRemote
            }
            BranchExistence::Absent if create_if_missing => {
                if !has_commits(repo) {
                    return Err(LockstepError::UnbornRepository(repo.to_path_buf()));
                }
                create_and_checkout(repo, name.as_str(), base)?;
                ApplyOutcome::Created
            }
            BranchExistence::Absent => {
                return Err(LockstepError::BranchNotFound {
                    branch: name.to_string(),
                    repo: repo.to_path_buf(),
                    guidance: not_found_guidance(repo, name),
                });
            }
        };

        tracing::info!(
            repo = %repo.display(),
            branch = %name,
            outcome = outcome.describe(),
            "branch applied"
        );
        Ok(outcome)
    }
}

/// Explain what exists instead and how to create the branch.
fn not_found_guidance(repo: &Path, name: &BranchName) -> String {
    let mut guidance = String::new();

    let local = list_local_branches(repo).unwrap_or_default();
    guidance.push_str(&format_branch_list("Local branches", &local));

    let remote = list_remote_branches(repo).unwrap_or_default();
    guidance.push_str(&format_branch_list("Remote branches", &remote));

    guidance.push_str(&format!(
        "\nTo create it, re-run with --create:\n  lockstep switch {} --create",
        name
    ));
    guidance
}

fn format_branch_list(title: &str, branches: &[String]) -> String {
    if branches.is_empty() {
        return format!("{}: (none)\n", title);
    }

    let mut out = format!("{}:\n", title);
    for branch in branches.iter().take(GUIDANCE_BRANCH_LIMIT) {
        out.push_str(&format!("  {}\n", branch));
    }
    if branches.len() > GUIDANCE_BRANCH_LIMIT {
        out.push_str(&format!(
            "  ... and {} more\n",
            branches.len() - GUIDANCE_BRANCH_LIMIT
        ));
    }
    out
}
