//! Command implementations for lockstep.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Logging is installed first so context resolution can be
//! traced; the configured level is applied once the config is loaded.

mod check;
mod resolve;
mod status;
mod switch;

use crate::cli::{Cli, Command};
use crate::context::SessionContext;
use crate::error::Result;
use crate::logging::init_logging;

pub use check::{cmd_check, run_check};
pub use resolve::{ResolveRow, cmd_resolve, run_resolve};
pub use status::{RepoStatus, cmd_status, run_status};
pub use switch::{SwitchResult, cmd_switch, run_switch};

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let logging = init_logging(cli.verbose)
        .inspect_err(|e| eprintln!("Warning: {:#}", e))
        .ok();

    let ctx = SessionContext::resolve(cli.repo.as_deref())?;
    tracing::debug!(repo = %ctx.repo, "resolved main repository");

    if let Some(logging) = &logging
        && let Err(e) = logging.apply_config_level(&ctx.config.log_level)
    {
        eprintln!("Warning: {:#}", e);
    }

    match cli.command {
        Command::Switch(args) => cmd_switch(&ctx, args),
        Command::Check(args) => cmd_check(&ctx, args),
        Command::Resolve(args) => cmd_resolve(&ctx, args),
        Command::Status(args) => cmd_status(&ctx, args),
    }
}
