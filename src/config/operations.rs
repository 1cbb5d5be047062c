//! Config loading, validation, and utility operations.

use super::model::{CONFIG_FILE_NAME, Config};
use crate::branch::BranchName;
use crate::error::{LockstepError, Result};
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockstepError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            LockstepError::UserError(format!("{} (in '{}')", e, path.display()))
        })
    }

    /// Load `.lockstep.yaml` from `repo_root`, or the defaults when absent.
    pub fn load_for_repo<P: AsRef<Path>>(repo_root: P) -> Result<Self> {
        let path = repo_root.as_ref().join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LockstepError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockstepError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `remote` must be non-empty
    /// - `fetch_timeout_secs` must be positive
    /// - `assistant` must be usable as a branch name prefix
    /// - `protected_branches` and `base_branch` entries must be valid branch names
    pub fn validate(&self) -> Result<()> {
        if self.remote.trim().is_empty() {
            return Err(LockstepError::UserError(
                "config validation failed: remote must not be empty".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(LockstepError::UserError(
                "config validation failed: fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }

        BranchName::parse(&self.assistant).map_err(|e| {
            LockstepError::UserError(format!(
                "config validation failed: assistant '{}' cannot prefix a branch name: {}",
                self.assistant, e
            ))
        })?;

        for name in self.protected_branches.iter().chain(&self.base_branch) {
            BranchName::parse(name).map_err(|e| {
                LockstepError::UserError(format!("config validation failed: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
