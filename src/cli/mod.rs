//! CLI argument parsing for lockstep.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lockstep: put a coding-assistant session on its own branch, across one
/// or more repositories at once.
///
/// The main repository is the one containing the working directory (or
/// `-C <repo>`). Auxiliary repositories are listed in the workspace file
/// and are moved onto the same branch, or all left where they started.
#[derive(Parser, Debug)]
#[command(name = "lockstep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in this directory.
    #[arg(short = 'C', long = "repo", global = true, value_name = "REPO")]
    pub repo: Option<PathBuf>,

    /// Log git decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lockstep.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Switch every repository onto a work branch.
    ///
    /// Without BRANCH a name `<assistant>-<timestamp>` is generated and
    /// created. Prints the effective branch name on stdout.
    Switch(SwitchArgs),

    /// Check that a branch name is valid and not protected.
    Check(CheckArgs),

    /// Report where a branch exists in each repository.
    ///
    /// May fetch from the remote; never switches branches.
    Resolve(ResolveArgs),

    /// Show the current branch and cleanliness of each repository.
    ///
    /// With BRANCH, fails when any repository is not on it.
    Status(StatusArgs),
}

/// Arguments for the `switch` command.
#[derive(Parser, Debug, Default)]
pub struct SwitchArgs {
    /// Branch to switch to. Generated when omitted.
    pub branch: Option<String>,

    /// Create the branch where it does not exist.
    #[arg(short, long)]
    pub create: bool,

    /// Start point for a branch created in the main repository.
    #[arg(long, value_name = "BRANCH")]
    pub base: Option<String>,

    /// Workspace file listing auxiliary repositories.
    #[arg(short, long, value_name = "FILE")]
    pub workspace: Option<PathBuf>,

    /// Prefix for a generated branch name.
    #[arg(long)]
    pub assistant: Option<String>,

    /// Show what would happen without switching anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report instead of the branch name.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Branch name to check.
    pub branch: String,
}

/// Arguments for the `resolve` command.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Branch name to look up.
    pub branch: String,

    /// Workspace file listing auxiliary repositories.
    #[arg(short, long, value_name = "FILE")]
    pub workspace: Option<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug, Default)]
pub struct StatusArgs {
    /// Branch every repository is expected to be on.
    pub branch: Option<String>,

    /// Workspace file listing auxiliary repositories.
    #[arg(short, long, value_name = "FILE")]
    pub workspace: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_switch_minimal() {
        let cli = Cli::try_parse_from(["lockstep", "switch"]).unwrap();
        assert!(cli.repo.is_none());
        assert!(!cli.verbose);
        if let Command::Switch(args) = cli.command {
            assert!(args.branch.is_none());
            assert!(!args.create);
            assert!(!args.dry_run);
            assert!(!args.json);
        } else {
            panic!("Expected Switch command");
        }
    }

    #[test]
    fn parse_switch_all_flags() {
        let cli = Cli::try_parse_from([
            "lockstep",
            "switch",
            "feature/x",
            "--create",
            "--base",
            "develop",
            "--workspace",
            "repos.txt",
            "--assistant",
            "claude",
            "--dry-run",
            "--json",
        ])
        .unwrap();
        if let Command::Switch(args) = cli.command {
            assert_eq!(args.branch.as_deref(), Some("feature/x"));
            assert!(args.create);
            assert_eq!(args.base.as_deref(), Some("develop"));
            assert_eq!(args.workspace, Some(PathBuf::from("repos.txt")));
            assert_eq!(args.assistant.as_deref(), Some("claude"));
            assert!(args.dry_run);
            assert!(args.json);
        } else {
            panic!("Expected Switch command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lockstep", "status", "-C", "/tmp/repo", "-v"]).unwrap();
        assert_eq!(cli.repo, Some(PathBuf::from("/tmp/repo")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn parse_check_requires_branch() {
        assert!(Cli::try_parse_from(["lockstep", "check"]).is_err());
        let cli = Cli::try_parse_from(["lockstep", "check", "main"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.branch, "main");
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn parse_resolve_with_workspace() {
        let cli =
            Cli::try_parse_from(["lockstep", "resolve", "feature/x", "-w", "ws.txt"]).unwrap();
        if let Command::Resolve(args) = cli.command {
            assert_eq!(args.branch, "feature/x");
            assert_eq!(args.workspace, Some(PathBuf::from("ws.txt")));
        } else {
            panic!("Expected Resolve command");
        }
    }

    #[test]
    fn parse_status_optional_branch() {
        let cli = Cli::try_parse_from(["lockstep", "status", "feature/x"]).unwrap();
        if let Command::Status(args) = cli.command {
            assert_eq!(args.branch.as_deref(), Some("feature/x"));
        } else {
            panic!("Expected Status command");
        }
    }
}
