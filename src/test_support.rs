use crate::branch::{BranchEngine, BranchName, RemoteFetcher};
use crate::error::{LockstepError, Result};
use std::cell::Cell;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A repository on `main` with one commit.
pub(crate) fn create_test_repo() -> TempDir {
    create_repo(CreateRepoOptions {
        commits: 1,
        default_branch: "main",
    })
}

/// A repository with a configurable default branch and history length.
pub(crate) fn create_test_repo_on(default_branch: &str, commits: usize) -> TempDir {
    create_repo(CreateRepoOptions {
        commits,
        default_branch,
    })
}

/// A repository whose HEAD points at an unborn `main`.
pub(crate) fn create_unborn_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();
    git(path, &["init"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    temp_dir
}

/// Clone `upstream` into a fresh directory so it has an `origin` remote.
pub(crate) fn create_clone(upstream: &Path) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let upstream_str = upstream.to_string_lossy().to_string();
    let target_str = temp_dir.path().to_string_lossy().to_string();
    git(upstream, &["clone", "--quiet", &upstream_str, &target_str]);
    configure_identity(temp_dir.path());
    temp_dir
}

struct CreateRepoOptions<'a> {
    commits: usize,
    default_branch: &'a str,
}

fn create_repo(opts: CreateRepoOptions<'_>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(
        path,
        &[
            "symbolic-ref",
            "HEAD",
            &format!("refs/heads/{}", opts.default_branch),
        ],
    );
    configure_identity(path);

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    for i in 2..=opts.commits {
        std::fs::write(path.join(format!("file{}.txt", i)), format!("File {}\n", i)).unwrap();
        git(path, &["add", "."]);
        git(path, &["commit", "-m", &format!("Commit {}", i)]);
    }

    temp_dir
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
}

/// Name of the branch currently checked out in `repo`, or `HEAD` when detached.
pub(crate) fn current_branch(repo: &Path) -> String {
    let full = git(repo, &["rev-parse", "--symbolic-full-name", "HEAD"]);
    full.strip_prefix("refs/heads/").unwrap_or(&full).to_string()
}

/// Returns true if `refs/heads/<branch>` exists in `repo`.
pub(crate) fn has_local_branch(repo: &Path, branch: &str) -> bool {
    Command::new("git")
        .current_dir(repo)
        .args([
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{}", branch),
        ])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Make a tracked file dirty.
pub(crate) fn make_dirty(repo: &Path) {
    std::fs::write(repo.join("README.md"), "# Modified\n").unwrap();
}

/// Run git in `repo_dir`, panicking on failure, and return trimmed stdout.
pub(crate) fn git(repo_dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A fetcher that records how often it was called and never touches the network.
pub(crate) struct CountingFetcher {
    calls: Cell<usize>,
    fail: bool,
}

impl CountingFetcher {
    pub(crate) fn new() -> Self {
        Self {
            calls: Cell::new(0),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            calls: Cell::new(0),
            fail: true,
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl RemoteFetcher for CountingFetcher {
    fn fetch(&self, _repo: &Path, _remote: &str) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            Err(LockstepError::GitError("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// An engine for `origin` whose fetches are counted instead of run.
pub(crate) fn counting_engine() -> BranchEngine<CountingFetcher> {
    BranchEngine::with_fetcher("origin", Vec::new(), CountingFetcher::new())
}

/// Parse a branch name known to be valid.
pub(crate) fn branch(name: &str) -> BranchName {
    BranchName::parse(name).unwrap()
}
