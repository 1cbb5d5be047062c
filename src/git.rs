//! Git command runner for lockstep.
//!
//! Provides a safe wrapper around git commands with captured stdout/stderr
//! and structured error handling. Every git invocation takes the repository
//! path explicitly; nothing here depends on the process working directory.

use crate::error::{LockstepError, Result};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }

    /// Returns stdout lines as a vector.
    pub fn lines(&self) -> Vec<&str> {
        if self.stdout.is_empty() {
            Vec::new()
        } else {
            self.stdout.lines().collect()
        }
    }
}

/// Run a git command with the specified working directory.
///
/// # Arguments
///
/// * `cwd` - The repository to run the command in
/// * `args` - The git command arguments (without "git" prefix)
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(LockstepError::GitError)` - On non-zero exit code
///
/// # Examples
///
/// ```no_run
/// use lockstep::git::run_git;
/// use std::path::Path;
///
/// let output = run_git(Path::new("."), &["branch", "--list"])?;
/// println!("Branches: {}", output.stdout);
/// # Ok::<(), lockstep::error::LockstepError>(())
/// ```
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            LockstepError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(LockstepError::GitError(format!(
            "git {} failed in '{}' (exit code {}): {}",
            args.first().unwrap_or(&""),
            cwd.display(),
            exit_code,
            error_msg
        )))
    }
}

/// Run a git command that may touch the network, killing it after `timeout`.
///
/// Interactive credential prompts are disabled so an unreachable or
/// authenticated remote fails fast instead of blocking the session.
/// Output is discarded; only success or failure is reported.
pub fn run_git_with_timeout<P: AsRef<Path>>(
    cwd: P,
    args: &[&str],
    timeout: Duration,
) -> Result<()> {
    let cwd = cwd.as_ref();

    let mut child = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            LockstepError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    match wait_with_timeout(&mut child, timeout)? {
        Some(0) => Ok(()),
        Some(code) => Err(LockstepError::GitError(format!(
            "git {} failed in '{}' (exit code {})",
            args.first().unwrap_or(&""),
            cwd.display(),
            code
        ))),
        None => Err(LockstepError::GitError(format!(
            "git {} timed out after {}s in '{}'",
            args.first().unwrap_or(&""),
            timeout.as_secs(),
            cwd.display()
        ))),
    }
}

/// Wait for a child process, killing it once `timeout` has elapsed.
///
/// Returns the exit code, or `None` if the process was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<i32>> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status.code().unwrap_or(-1))),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(LockstepError::GitError(format!(
                    "failed to check git process status: {}",
                    e
                )));
            }
        }
    }
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The absolute path to the repository root
/// * `Err(LockstepError::UserError)` - If not inside a git repository
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<std::path::PathBuf> {
    let output = run_git_for_repo_detection(cwd.as_ref(), &["rev-parse", "--show-toplevel"])?;
    Ok(std::path::PathBuf::from(&output.stdout))
}

/// Returns a UserError instead of GitError so "not in a git repo" exits with 1.
fn run_git_for_repo_detection<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            LockstepError::UserError(format!(
                "failed to execute git in '{}': {} (is git installed and does the directory exist?)",
                cwd.display(),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let stderr = &git_output.stderr;
        if stderr.contains("not a git repository") || stderr.contains("fatal:") {
            Err(LockstepError::UserError(format!(
                "'{}' is not inside a git repository. Run this command from within a git repository or pass -C <repo>.",
                cwd.display()
            )))
        } else {
            Err(LockstepError::UserError(format!(
                "git command failed: {}",
                if stderr.is_empty() {
                    &git_output.stdout
                } else {
                    stderr
                }
            )))
        }
    }
}

/// Check if the working directory has uncommitted tracked changes.
///
/// Uses `git status --porcelain --untracked-files=no`; untracked files do not
/// count because a checkout never discards them silently.
pub fn has_uncommitted_changes<P: AsRef<Path>>(cwd: P) -> Result<bool> {
    let output = run_git(cwd, &["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!output.is_empty())
}

/// Require a clean working tree before switching branches.
///
/// # Returns
///
/// * `Ok(())` - If the tree is clean
/// * `Err(LockstepError::PreconditionError)` - If there are uncommitted changes
pub fn ensure_clean_worktree<P: AsRef<Path>>(repo: P) -> Result<()> {
    let repo = repo.as_ref();

    if has_uncommitted_changes(repo)? {
        Err(LockstepError::PreconditionError(format!(
            "repository '{}' has uncommitted changes.\n\n\
             Commit or stash them before switching branches:\n\
             git -C {} status",
            repo.display(),
            repo.display()
        )))
    } else {
        Ok(())
    }
}

/// Returns true if HEAD points at a commit (the repository is not unborn).
pub fn has_commits<P: AsRef<Path>>(repo: P) -> bool {
    run_git(repo, &["rev-parse", "--verify", "--quiet", "HEAD"]).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_repo, create_unborn_repo};
    use tempfile::TempDir;

    #[test]
    fn test_run_git_success() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["status", "--porcelain"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_git_failure_returns_git_error() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["checkout", "nonexistent-branch"]);
        let err = result.unwrap_err();
        assert!(matches!(err, LockstepError::GitError(_)));
        assert!(err.to_string().contains("git checkout failed"));
    }

    #[test]
    fn test_run_git_with_timeout_success() {
        let temp_dir = create_test_repo();
        let result = run_git_with_timeout(
            temp_dir.path(),
            &["rev-parse", "HEAD"],
            Duration::from_secs(10),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_git_with_timeout_reports_failure() {
        let temp_dir = create_test_repo();
        let result = run_git_with_timeout(
            temp_dir.path(),
            &["fetch", "no-such-remote"],
            Duration::from_secs(10),
        );
        assert!(matches!(result, Err(LockstepError::GitError(_))));
    }

    #[test]
    fn test_get_repo_root_from_subdirectory() {
        let temp_dir = create_test_repo();
        let subdir = temp_dir.path().join("subdir").join("nested");
        std::fs::create_dir_all(&subdir).unwrap();

        let root = get_repo_root(&subdir).unwrap();
        let expected = temp_dir.path().canonicalize().unwrap();
        assert_eq!(root.canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_get_repo_root_outside_repo_returns_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = get_repo_root(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LockstepError::UserError(_)));
        assert!(err.to_string().contains("not inside a git repository"));
    }

    #[test]
    fn test_has_uncommitted_changes() {
        let temp_dir = create_test_repo();
        assert!(!has_uncommitted_changes(temp_dir.path()).unwrap());

        std::fs::write(temp_dir.path().join("README.md"), "# Modified\n").unwrap();
        assert!(has_uncommitted_changes(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_has_uncommitted_changes_ignores_untracked() {
        let temp_dir = create_test_repo();
        std::fs::write(temp_dir.path().join("untracked.txt"), "untracked\n").unwrap();
        assert!(!has_uncommitted_changes(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_ensure_clean_worktree_fails_with_changes() {
        let temp_dir = create_test_repo();
        assert!(ensure_clean_worktree(temp_dir.path()).is_ok());

        std::fs::write(temp_dir.path().join("README.md"), "# Modified\n").unwrap();
        let err = ensure_clean_worktree(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LockstepError::PreconditionError(_)));
        assert!(err.to_string().contains("uncommitted changes"));
    }

    #[test]
    fn test_has_commits() {
        let repo = create_test_repo();
        assert!(has_commits(repo.path()));

        let unborn = create_unborn_repo();
        assert!(!has_commits(unborn.path()));
    }

    #[test]
    fn test_git_output_lines() {
        let output = GitOutput {
            stdout: "line1\nline2\nline3".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.lines(), vec!["line1", "line2", "line3"]);

        let empty = GitOutput {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(empty.lines().is_empty());
        assert!(empty.is_empty());
    }
}
