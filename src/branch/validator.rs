//! Branch name validation: format rules plus the repository's protected set.

use super::name::{BranchName, BranchNameError};
use super::protected::ProtectedBranchSet;
use std::path::Path;

/// Validate a work branch name for `repo`.
///
/// Rejects empty names, characters outside `[a-zA-Z0-9._/-]`, and names in
/// the repository's protected set. Reads git state but never mutates it.
pub fn validate<P: AsRef<Path>>(
    name: &str,
    repo: P,
    remote: &str,
    extra_protected: &[String],
) -> Result<BranchName, BranchNameError> {
    let branch = BranchName::parse(name)?;
    let protected = ProtectedBranchSet::detect(repo, remote, extra_protected);
    ensure_not_protected(&branch, &protected)?;
    Ok(branch)
}

/// Reject `branch` if it is in `protected`.
pub fn ensure_not_protected(
    branch: &BranchName,
    protected: &ProtectedBranchSet,
) -> Result<(), BranchNameError> {
    match protected.reason(branch.as_str()) {
        Some(reason) => Err(BranchNameError::Protected {
            name: branch.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_clone, create_test_repo, create_test_repo_on};

    #[test]
    fn valid_names_pass() {
        let repo = create_test_repo();
        for name in ["feature/x", "agent-2025-01-01-000000", "fix.1_a"] {
            let branch = validate(name, repo.path(), "origin", &[]).unwrap();
            assert_eq!(branch.as_str(), name);
        }
    }

    #[test]
    fn protected_names_fail_even_when_well_formed() {
        let repo = create_test_repo();
        for name in ["main", "master"] {
            let err = validate(name, repo.path(), "origin", &[]).unwrap_err();
            assert!(matches!(err, BranchNameError::Protected { .. }));
            assert!(err.to_string().contains("feature branch"));
        }
    }

    #[test]
    fn remote_default_branch_is_protected() {
        let upstream = create_test_repo_on("develop", 1);
        let clone = create_clone(upstream.path());
        let err = validate("develop", clone.path(), "origin", &[]).unwrap_err();
        assert_eq!(
            err,
            BranchNameError::Protected {
                name: "develop".to_string(),
                reason: "default branch of remote 'origin'".to_string(),
            }
        );
    }

    #[test]
    fn configured_names_are_protected() {
        let repo = create_test_repo();
        let extra = vec!["release".to_string()];
        assert!(validate("release", repo.path(), "origin", &extra).is_err());
        assert!(validate("release/1.0", repo.path(), "origin", &extra).is_ok());
    }

    #[test]
    fn format_errors_come_before_protection() {
        let repo = create_test_repo();
        assert!(matches!(
            validate("main;", repo.path(), "origin", &[]).unwrap_err(),
            BranchNameError::InvalidCharacters { .. }
        ));
        assert_eq!(
            validate("", repo.path(), "origin", &[]).unwrap_err(),
            BranchNameError::Empty
        );
    }
}
