//! Session context resolution for lockstep.
//!
//! Every command starts here: find the main repository from the working
//! directory (or `-C <repo>`), load `.lockstep.yaml` from its root, and
//! locate the workspace file listing the auxiliary repositories.

use crate::branch::BranchEngine;
use crate::config::Config;
use crate::error::{LockstepError, Result};
use crate::git;
use crate::workspace::{RepositoryHandle, load_workspace_file};
use std::env;
use std::path::{Path, PathBuf};

/// Resolved main repository and configuration for one invocation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The main repository (top level of the working tree).
    pub repo: RepositoryHandle,

    pub config: Config,
}

impl SessionContext {
    /// Resolve the context from `repo_override`, or the current directory.
    ///
    /// # Returns
    ///
    /// * `Ok(SessionContext)` - Successfully resolved context
    /// * `Err(LockstepError::UserError)` - If not in a git repository or the config is invalid (exit code 1)
    pub fn resolve(repo_override: Option<&Path>) -> Result<Self> {
        match repo_override {
            Some(path) => Self::resolve_from(path),
            None => {
                let cwd = env::current_dir().map_err(|e| {
                    LockstepError::UserError(format!(
                        "failed to get current working directory: {}",
                        e
                    ))
                })?;
                Self::resolve_from(&cwd)
            }
        }
    }

    /// Resolve the context from any directory inside the main repository.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let root = git::get_repo_root(cwd)?;
        let repo = RepositoryHandle::open(&root)?;
        let config = Config::load_for_repo(repo.path())?;

        Ok(Self { repo, config })
    }

    /// Path of the configured workspace file.
    pub fn default_workspace_path(&self) -> PathBuf {
        self.repo.path().join(&self.config.workspace_file)
    }

    /// Load the auxiliary repositories.
    ///
    /// An explicit path must exist. The configured default may be absent,
    /// which means the session covers the main repository only.
    pub fn load_auxiliary(&self, explicit: Option<&Path>) -> Result<Vec<RepositoryHandle>> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = self.default_workspace_path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no workspace file");
                    return Ok(Vec::new());
                }
                path
            }
        };

        load_workspace_file(&path, self.repo.path())
    }

    /// Branch engine configured for this session.
    pub fn engine(&self) -> BranchEngine {
        BranchEngine::new(
            &self.config.remote,
            self.config.protected_branches.clone(),
            self.config.fetch_timeout(),
        )
    }
}
