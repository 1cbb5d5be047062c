//! Lockstep: branch lifecycle and multi-repository synchronization for
//! isolated coding-assistant sessions.
//!
//! The main repository and any auxiliary repositories listed in the
//! workspace file are moved onto one work branch as a unit. If any
//! repository fails partway through, every repository already moved is
//! returned to the branch it started on and only branches created by the
//! attempt are deleted.

pub mod branch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod logging;
pub mod sync;
pub mod workspace;

#[cfg(test)]
mod test_support;
