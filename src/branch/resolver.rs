//! Branch existence resolution: local first, then a best-effort fetch.
//!
//! Local branches are checked before anything touches the network, so a
//! purely local workflow never triggers credential prompts. The fetch is
//! pluggable through [`RemoteFetcher`] and its failure is an explicit,
//! reported outcome rather than an error.

use super::name::BranchName;
use super::refs::{find_remote_branch, local_branch_exists};
use crate::error::{LockstepError, Result};
use crate::git::{run_git, run_git_with_timeout};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Where a branch name exists in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BranchExistence {
    /// A local branch with this name exists.
    Local,
    /// Only a remote-tracking ref exists; `reference` is the ref as listed.
    Remote { reference: String },
    /// The name exists neither locally nor remotely.
    Absent,
}

impl fmt::Display for BranchExistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchExistence::Local => f.write_str("local"),
            BranchExistence::Remote { reference } => write!(f, "remote ({})", reference),
            BranchExistence::Absent => f.write_str("none"),
        }
    }
}

/// What happened to the remote fetch during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fetch", content = "reason", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The branch was found locally so no fetch was attempted.
    NotAttempted,
    Fetched,
    /// The fetch failed; remote refs were checked as last known.
    Failed(String),
}

/// Result of resolving one branch name in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistenceReport {
    pub state: BranchExistence,
    pub fetch: FetchOutcome,
}

/// Updates remote-tracking refs for a repository.
pub trait RemoteFetcher {
    fn fetch(&self, repo: &Path, remote: &str) -> Result<()>;
}

/// Fetches with `git fetch --quiet <remote>` under a timeout.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    timeout: Duration,
}

impl GitFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RemoteFetcher for GitFetcher {
    fn fetch(&self, repo: &Path, remote: &str) -> Result<()> {
        let remotes = run_git(repo, &["remote"])?;
        if !remotes.lines().contains(&remote) {
            return Err(LockstepError::GitError(format!(
                "remote '{}' is not configured",
                remote
            )));
        }

        run_git_with_timeout(repo, &["fetch", "--quiet", remote], self.timeout)
    }
}

/// Classify `name` in `repo` as local, remote or absent.
///
/// 1. A local branch returns `Local` immediately without fetching.
/// 2. Otherwise fetch `remote` (failures are logged and reported in the
///    returned [`FetchOutcome`]) and look for `<remote>/<name>` or `<name>`
///    among the remote-tracking refs.
/// 3. Otherwise `Absent`.
pub fn resolve<P: AsRef<Path>>(
    repo: P,
    name: &BranchName,
    remote: &str,
    fetcher: &dyn RemoteFetcher,
) -> Result<ExistenceReport> {
    let repo = repo.as_ref();

    if local_branch_exists(repo, name.as_str()) {
        tracing::debug!(repo = %repo.display(), branch = %name, "branch exists locally");
        return Ok(ExistenceReport {
            state: BranchExistence::Local,
            fetch: FetchOutcome::NotAttempted,
        });
    }

    let fetch = match fetcher.fetch(repo, remote) {
        Ok(()) => FetchOutcome::Fetched,
        Err(e) => {
            tracing::warn!(
                repo = %repo.display(),
                remote,
                error = %e,
                "fetch failed, checking last known remote refs"
            );
            FetchOutcome::Failed(e.to_string())
        }
    };

    let state = match find_remote_branch(repo, remote, name.as_str())? {
        Some(reference) => BranchExistence::Remote { reference },
        None => BranchExistence::Absent,
    };
    tracing::debug!(repo = %repo.display(), branch = %name, state = %state, "resolved branch");

    Ok(ExistenceReport { state, fetch })
}
