//! Config struct definition and default implementation.

use crate::logging::DEFAULT_LOG_LEVEL;
use crate::workspace::DEFAULT_WORKSPACE_FILE;
use serde::{Deserialize, Serialize};

/// Config file name, relative to the main repository root.
pub const CONFIG_FILE_NAME: &str = ".lockstep.yaml";

/// Configuration for lockstep.
///
/// Command-line flags take precedence over these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Git settings
    // =========================================================================
    /// Remote consulted for remote branches and the default branch.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Start point for branches created in the main repository.
    /// When unset, new branches start from the current HEAD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,

    /// Branch names protected in addition to `main`, `master` and the
    /// remote's default branch.
    #[serde(default)]
    pub protected_branches: Vec<String>,

    /// Seconds before a remote fetch is abandoned.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    // =========================================================================
    // Session settings
    // =========================================================================
    /// Assistant name, used as the prefix of generated branch names.
    #[serde(default = "default_assistant")]
    pub assistant: String,

    /// Workspace file listing auxiliary repositories, relative to the main
    /// repository root.
    #[serde(default = "default_workspace_file")]
    pub workspace_file: String,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Default log filter (overridden by `RUST_LOG` and `--verbose`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            base_branch: None,
            protected_branches: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            assistant: default_assistant(),
            workspace_file: default_workspace_file(),
            log_level: default_log_level(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_assistant() -> String {
    "agent".to_string()
}

fn default_workspace_file() -> String {
    DEFAULT_WORKSPACE_FILE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
