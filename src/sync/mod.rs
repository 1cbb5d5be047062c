//! Multi-repository synchronization with saga-style rollback.
//!
//! There is no transaction across repositories. Instead every HEAD is
//! captured up front, each repository is switched one at a time in a fixed
//! order, and on the first failure the completed repositories are undone in
//! reverse order.
//!
//! Repositories are processed sequentially; rollback relies on that order.

mod coordinator;
mod ledger;

// Re-export public API
pub use coordinator::{
    PlannedAction, PlannedStep, RepoOutcome, SyncFailure, SyncReport, SyncRequest, plan, sync,
};
pub use ledger::{OriginalBranchRecord, RollbackError, RollbackReport, RollbackStep, SyncLedger};
