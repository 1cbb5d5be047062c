//! Branch name type, format rules and auto-generated names.

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Characters allowed in a work branch name.
///
/// The name is later passed to git and to the container runtime, so anything
/// outside this set is rejected rather than escaped.
static BRANCH_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._/-]+$").expect("Invalid branch name regex"));

/// Timestamp format used in generated branch names.
pub const GENERATED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Reasons a branch name is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchNameError {
    #[error("branch name must not be empty")]
    Empty,

    #[error(
        "invalid branch name '{name}': contains disallowed characters {}.\n\n\
         Branch names may only contain letters, digits, '.', '_', '/' and '-'.",
        format_chars(.invalid)
    )]
    InvalidCharacters { name: String, invalid: Vec<char> },

    #[error("invalid branch name '{name}': must not start with '-'")]
    LeadingDash { name: String },

    #[error("branch '{name}' is protected ({reason}).\n\nUse a feature branch name instead, e.g. 'feature/{name}-work'.")]
    Protected { name: String, reason: String },
}

fn format_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A syntactically valid branch name.
///
/// Construction only checks the character set; protection rules depend on
/// the repository and are applied by [`crate::branch::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Parse a user-supplied branch name.
    pub fn parse(name: &str) -> Result<Self, BranchNameError> {
        if name.is_empty() {
            return Err(BranchNameError::Empty);
        }

        if !BRANCH_NAME_REGEX.is_match(name) {
            let mut invalid: Vec<char> = name
                .chars()
                .filter(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')))
                .collect();
            invalid.dedup();
            return Err(BranchNameError::InvalidCharacters {
                name: name.to_string(),
                invalid,
            });
        }

        // git would read the name as an option
        if name.starts_with('-') {
            return Err(BranchNameError::LeadingDash {
                name: name.to_string(),
            });
        }

        Ok(Self(name.to_string()))
    }

    /// Generate `{prefix}-{YYYY-MM-DD-HHMMSS}` for the current local time.
    pub fn generate(prefix: &str) -> Result<Self, BranchNameError> {
        Self::generate_at(prefix, Local::now())
    }

    /// Generate a timestamped branch name for a fixed instant.
    pub fn generate_at(prefix: &str, at: DateTime<Local>) -> Result<Self, BranchNameError> {
        Self::parse(&format!(
            "{}-{}",
            prefix,
            at.format(GENERATED_TIMESTAMP_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
