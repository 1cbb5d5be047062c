//! Error types for the lockstep CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::branch::BranchNameError;
use crate::exit_codes;
use crate::sync::SyncFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lockstep operations.
///
/// Each variant maps to a specific exit code so scripts wrapping the CLI can
/// tell validation problems apart from git failures and rolled-back syncs.
#[derive(Error, Debug)]
pub enum LockstepError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// The requested branch name is malformed or protected.
    #[error(transparent)]
    InvalidBranch(#[from] BranchNameError),

    /// A repository is not in a state that allows the operation.
    #[error("{0}")]
    PreconditionError(String),

    /// The repository has no commits, so no branch can be created from it.
    #[error(
        "repository '{}' has no commits yet.\n\n\
         A branch cannot be created in an empty repository. Create an initial commit first:\n\
         git -C {} commit --allow-empty -m \"Initial commit\"",
        .0.display(),
        .0.display()
    )]
    UnbornRepository(PathBuf),

    /// The branch exists neither locally nor remotely and creation was not requested.
    #[error("branch '{branch}' not found in '{}'.\n\n{guidance}", repo.display())]
    BranchNotFound {
        branch: String,
        repo: PathBuf,
        guidance: String,
    },

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// A workspace repository failed and every repository was rolled back.
    #[error("{0}")]
    SyncFailed(Box<SyncFailure>),
}

impl LockstepError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockstepError::UserError(_) => exit_codes::USER_ERROR,
            LockstepError::InvalidBranch(_) => exit_codes::VALIDATION_FAILURE,
            LockstepError::PreconditionError(_) => exit_codes::PRECONDITION_FAILURE,
            LockstepError::UnbornRepository(_) => exit_codes::PRECONDITION_FAILURE,
            LockstepError::BranchNotFound { .. } => exit_codes::BRANCH_NOT_FOUND,
            LockstepError::GitError(_) => exit_codes::GIT_FAILURE,
            LockstepError::SyncFailed(_) => exit_codes::SYNC_FAILURE,
        }
    }
}

/// Result type alias for lockstep operations.
pub type Result<T> = std::result::Result<T, LockstepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = LockstepError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn invalid_branch_has_validation_exit_code() {
        let err = LockstepError::from(BranchNameError::Empty);
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn git_error_has_correct_exit_code() {
        let err = LockstepError::GitError("checkout failed".to_string());
        assert_eq!(err.exit_code(), exit_codes::GIT_FAILURE);
    }

    #[test]
    fn unborn_repository_is_a_precondition_failure() {
        let err = LockstepError::UnbornRepository(PathBuf::from("/tmp/empty"));
        assert_eq!(err.exit_code(), exit_codes::PRECONDITION_FAILURE);
        assert!(err.to_string().contains("no commits yet"));
        assert!(err.to_string().contains("Initial commit"));
    }

    #[test]
    fn branch_not_found_includes_guidance() {
        let err = LockstepError::BranchNotFound {
            branch: "feature/x".to_string(),
            repo: PathBuf::from("/tmp/repo"),
            guidance: "Use --create to create it.".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::BRANCH_NOT_FOUND);
        let msg = err.to_string();
        assert!(msg.contains("'feature/x' not found in '/tmp/repo'"));
        assert!(msg.contains("--create"));
    }
}
