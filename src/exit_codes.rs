//! Exit code constants for the lockstep CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad configuration)
//! - 2: Branch name validation failure (format or protected)
//! - 3: Git operation failure
//! - 4: Precondition failure (dirty tree, no commits, unreadable repo)
//! - 5: Branch not found and creation not requested
//! - 6: Workspace sync failed and was rolled back

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration or workspace file.
pub const USER_ERROR: i32 = 1;

/// Branch name rejected: invalid characters, empty, or protected.
pub const VALIDATION_FAILURE: i32 = 2;

/// Git operation failure: checkout, branch creation or deletion errors.
pub const GIT_FAILURE: i32 = 3;

/// Precondition failure: uncommitted changes, unborn repository, unreadable path.
pub const PRECONDITION_FAILURE: i32 = 4;

/// The branch exists nowhere and `--create` was not given.
pub const BRANCH_NOT_FOUND: i32 = 5;

/// A repository in the workspace failed; all repositories were rolled back.
pub const SYNC_FAILURE: i32 = 6;
