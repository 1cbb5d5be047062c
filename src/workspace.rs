//! Repository handles and the workspace file.
//!
//! The workspace file lists auxiliary repositories that move in lockstep
//! with the main one:
//!
//! ```text
//! # shared libraries
//! ~/src/shared-lib
//! ../frontend
//! ```
//!
//! One path per line, `#` comments and blank lines ignored, `~` expanded to
//! the home directory, relative paths resolved against the main repository
//! and every path canonicalized.

use crate::error::{LockstepError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default workspace file name, relative to the main repository root.
pub const DEFAULT_WORKSPACE_FILE: &str = ".lockstep-workspace";

/// A git working directory, identified by its canonical path.
///
/// lockstep only ever changes which branch a repository has checked out;
/// it never creates or removes repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RepositoryHandle {
    path: PathBuf,
}

impl RepositoryHandle {
    /// Open the repository at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(RepositoryHandle)` - The canonical path contains `.git`
    /// * `Err(LockstepError::PreconditionError)` - The path is unreadable or not a repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            LockstepError::PreconditionError(format!(
                "repository path '{}' is not readable: {}",
                path.display(),
                e
            ))
        })?;

        // `.git` is a file in linked worktrees
        if !canonical.join(".git").exists() {
            return Err(LockstepError::PreconditionError(format!(
                "'{}' is not a git repository (no .git found)",
                canonical.display()
            )));
        }

        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for RepositoryHandle {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Load auxiliary repositories from a workspace file.
///
/// Relative entries resolve against `base_dir` (the main repository root).
pub fn load_workspace_file(path: &Path, base_dir: &Path) -> Result<Vec<RepositoryHandle>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        LockstepError::UserError(format!(
            "failed to read workspace file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_workspace(&content, path, base_dir, dirs::home_dir().as_deref())
}

/// Parse workspace file content.
///
/// `source` is only used in error messages.
pub fn parse_workspace(
    content: &str,
    source: &Path,
    base_dir: &Path,
    home: Option<&Path>,
) -> Result<Vec<RepositoryHandle>> {
    let mut repos = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let located = |message: String| {
            LockstepError::PreconditionError(format!(
                "{}:{}: {}",
                source.display(),
                index + 1,
                message
            ))
        };

        let expanded = expand_home(line, home).map_err(located)?;
        let path = if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        };

        let handle = RepositoryHandle::open(&path).map_err(|e| located(e.to_string()))?;
        repos.push(handle);
    }

    tracing::debug!(source = %source.display(), count = repos.len(), "loaded workspace");
    Ok(repos)
}

/// Expand a leading `~` or `~/` to `home`.
pub fn expand_home(raw: &str, home: Option<&Path>) -> std::result::Result<PathBuf, String> {
    let rest = match raw.strip_prefix('~') {
        None => return Ok(PathBuf::from(raw)),
        Some(rest) => rest,
    };

    if !rest.is_empty() && !rest.starts_with('/') {
        return Err(format!(
            "'{}': only '~' and '~/...' are supported, not '~user'",
            raw
        ));
    }

    let home = home.ok_or_else(|| format!("'{}': home directory is unknown", raw))?;
    Ok(home.join(rest.trim_start_matches('/')))
}

/// Reject auxiliary lists that would corrupt a sync.
///
/// An auxiliary entry resolving to the main repository would be switched
/// twice and rolled back twice; a duplicate entry has the same problem.
pub fn check_workspace(main: &RepositoryHandle, auxiliary: &[RepositoryHandle]) -> Result<()> {
    let mut seen = BTreeSet::new();

    for repo in auxiliary {
        if repo == main {
            return Err(LockstepError::UserError(format!(
                "workspace repository '{}' is the main repository itself.\n\n\
                 Remove it from the workspace file; the main repository is always included.",
                repo
            )));
        }
        if !seen.insert(repo) {
            return Err(LockstepError::UserError(format!(
                "workspace repository '{}' is listed more than once",
                repo
            )));
        }
    }

    Ok(())
}
