//! Branch lifecycle for a single repository.
//!
//! - Validating work branch names (format and protected names)
//! - Resolving whether a branch exists locally, remotely or nowhere
//! - Switching to, tracking or creating the branch
//!
//! All git failures are mapped to `LockstepError::GitError` (exit code 3).

mod engine;
mod name;
mod protected;
pub mod refs;
mod resolver;
mod validator;

// Re-export public API
pub use engine::{ApplyOutcome, BranchEngine};
pub use name::{BranchName, BranchNameError, GENERATED_TIMESTAMP_FORMAT};
pub use protected::{ALWAYS_PROTECTED, ProtectedBranchSet, detect_default_branch};
pub use refs::HeadState;
pub use resolver::{
    BranchExistence, ExistenceReport, FetchOutcome, GitFetcher, RemoteFetcher, resolve,
};
pub use validator::{ensure_not_protected, validate};
