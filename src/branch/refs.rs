//! Branch plumbing: listing, checking, creating, checking out and deleting.
//!
//! Each function performs at most one mutating git command against the
//! repository it is given.

use crate::error::{LockstepError, Result};
use crate::git::run_git;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// What HEAD points at in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum HeadState {
    /// HEAD is attached to a local branch.
    Branch(String),
    /// HEAD is detached at this commit id.
    Detached(String),
}

impl HeadState {
    /// Returns the branch name when HEAD is attached.
    pub fn branch(&self) -> Option<&str> {
        match self {
            HeadState::Branch(name) => Some(name),
            HeadState::Detached(_) => None,
        }
    }

}

impl fmt::Display for HeadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadState::Branch(name) => f.write_str(name),
            HeadState::Detached(sha) => {
                write!(f, "(detached at {})", &sha[..sha.len().min(12)])
            }
        }
    }
}

/// Read what HEAD currently points at.
///
/// An unborn branch is reported as `Branch` since `symbolic-ref` still names it.
/// The full ref is read and stripped rather than using `--short`, which
/// disambiguates to `heads/<name>` when a tag shares the branch's name.
pub fn read_head<P: AsRef<Path>>(repo: P) -> Result<HeadState> {
    let repo = repo.as_ref();

    if let Ok(output) = run_git(repo, &["symbolic-ref", "--quiet", "HEAD"])
        && let Some(name) = output.stdout.strip_prefix("refs/heads/")
        && !name.is_empty()
    {
        return Ok(HeadState::Branch(name.to_string()));
    }

    let output = run_git(repo, &["rev-parse", "HEAD"]).map_err(|e| {
        LockstepError::GitError(format!(
            "failed to read HEAD of '{}': {}",
            repo.display(),
            e
        ))
    })?;
    Ok(HeadState::Detached(output.stdout))
}

/// Check if a branch exists locally.
pub fn local_branch_exists<P: AsRef<Path>>(repo: P, branch: &str) -> bool {
    run_git(
        repo,
        &[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{}", branch),
        ],
    )
    .is_ok()
}

/// List local branch names.
pub fn list_local_branches<P: AsRef<Path>>(repo: P) -> Result<Vec<String>> {
    let output = run_git(
        repo,
        &["for-each-ref", "--format=%(refname:lstrip=2)", "refs/heads"],
    )?;
    Ok(output.lines().into_iter().map(str::to_string).collect())
}

/// List remote-tracking branch names (e.g. `origin/feature/x`).
///
/// Symbolic entries such as `origin/HEAD` are skipped.
pub fn list_remote_branches<P: AsRef<Path>>(repo: P) -> Result<Vec<String>> {
    let output = run_git(
        repo,
        &[
            "for-each-ref",
            "--format=%(symref)|%(refname:lstrip=2)",
            "refs/remotes",
        ],
    )?;
    Ok(output
        .lines()
        .into_iter()
        .filter_map(|line| match line.split_once('|') {
            Some(("", name)) => Some(name.to_string()),
            _ => None,
        })
        .collect())
}

/// Find the remote-tracking ref for `branch`.
///
/// Accepts both the `<remote>/<branch>` spelling and a bare `<branch>`
/// entry, returning the ref exactly as git lists it.
pub fn find_remote_branch<P: AsRef<Path>>(
    repo: P,
    remote: &str,
    branch: &str,
) -> Result<Option<String>> {
    let prefixed = format!("{}/{}", remote, branch);
    let remotes = list_remote_branches(repo)?;

    if remotes.iter().any(|r| r == &prefixed) {
        return Ok(Some(prefixed));
    }
    Ok(remotes.into_iter().find(|r| r == branch))
}

/// Check out an existing local branch.
///
/// `--no-guess` keeps git from creating the branch out of a same-named
/// remote-tracking ref when the local branch is missing.
pub fn checkout_branch<P: AsRef<Path>>(repo: P, branch: &str) -> Result<()> {
    run_git(repo, &["checkout", "--quiet", "--no-guess", branch, "--"]).map_err(|e| {
        LockstepError::GitError(format!("failed to check out '{}': {}", branch, e))
    })?;
    Ok(())
}

/// Return the repository to a previously captured HEAD.
pub fn checkout_head<P: AsRef<Path>>(repo: P, head: &HeadState) -> Result<()> {
    match head {
        HeadState::Branch(name) => checkout_branch(repo, name),
        HeadState::Detached(sha) => {
            run_git(repo, &["checkout", "--quiet", "--detach", sha]).map_err(|e| {
                LockstepError::GitError(format!("failed to check out commit {}: {}", sha, e))
            })?;
            Ok(())
        }
    }
}

/// Create `branch` and check it out.
///
/// Starts from `start_point` when given, otherwise from the current HEAD.
pub fn create_and_checkout<P: AsRef<Path>>(
    repo: P,
    branch: &str,
    start_point: Option<&str>,
) -> Result<()> {
    let mut args = vec!["checkout", "--quiet", "-b", branch];
    if let Some(start) = start_point {
        args.push(start);
    }

    run_git(repo, &args).map_err(|e| {
        LockstepError::GitError(format!(
            "failed to create branch '{}' from {}: {}",
            branch,
            start_point.unwrap_or("HEAD"),
            e
        ))
    })?;
    Ok(())
}

/// Create a local branch tracking `remote_ref` and check it out.
pub fn create_tracking_branch<P: AsRef<Path>>(
    repo: P,
    branch: &str,
    remote_ref: &str,
) -> Result<()> {
    run_git(repo, &["checkout", "--quiet", "--track", "-b", branch, remote_ref]).map_err(
        |e| {
            LockstepError::GitError(format!(
                "failed to create '{}' tracking {}: {}",
                branch, remote_ref, e
            ))
        },
    )?;
    Ok(())
}

/// Delete a branch.
///
/// Uses `git branch -d` unless `force` is set, in which case `-D` deletes
/// even unmerged work.
pub fn delete_branch<P: AsRef<Path>>(repo: P, branch: &str, force: bool) -> Result<()> {
    let delete_flag = if force { "-D" } else { "-d" };

    run_git(repo, &["branch", delete_flag, branch]).map_err(|e| {
        LockstepError::GitError(format!("failed to delete branch '{}': {}", branch, e))
    })?;

    Ok(())
}
