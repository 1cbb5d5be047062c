//! Protected branch detection.

use crate::git::run_git;
use std::collections::BTreeMap;
use std::path::Path;

/// Branch names that are protected in every repository.
pub const ALWAYS_PROTECTED: &[&str] = &["main", "master"];

/// Branch names that must never be used as a work branch, with the reason
/// each one is protected.
///
/// Built fresh for every invocation and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProtectedBranchSet {
    entries: BTreeMap<String, String>,
}

impl ProtectedBranchSet {
    /// The set every repository starts from: `main` and `master`.
    pub fn builtin() -> Self {
        let mut set = Self::default();
        for name in ALWAYS_PROTECTED {
            set.insert(name, "always protected");
        }
        set
    }

    /// Build the protected set for `repo`.
    ///
    /// Adds the default branch advertised by `remote` (when it can be
    /// detected) and any configured extra names to the builtin set.
    pub fn detect<P: AsRef<Path>>(repo: P, remote: &str, extra: &[String]) -> Self {
        let mut set = Self::builtin();

        if let Some(default_branch) = detect_default_branch(repo.as_ref(), remote) {
            set.insert(
                &default_branch,
                &format!("default branch of remote '{}'", remote),
            );
        }

        for name in extra {
            set.insert(name, "listed in protected_branches");
        }

        set
    }

    fn insert(&mut self, name: &str, reason: &str) {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| reason.to_string());
    }

    /// Returns the protection reason if `name` is protected.
    pub fn reason(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Protected names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Read the branch `refs/remotes/<remote>/HEAD` points at.
///
/// Returns `None` when the remote or its HEAD is unknown; that is not an error.
pub fn detect_default_branch(repo: &Path, remote: &str) -> Option<String> {
    let remote_head = format!("refs/remotes/{}/HEAD", remote);
    match run_git(repo, &["symbolic-ref", "--quiet", &remote_head]) {
        Ok(output) => {
            let prefix = format!("refs/remotes/{}/", remote);
            output
                .stdout
                .strip_prefix(&prefix)
                .filter(|branch| !branch.is_empty())
                .map(str::to_string)
        }
        Err(e) => {
            tracing::debug!(repo = %repo.display(), remote, error = %e, "no remote default branch");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_clone, create_test_repo, create_test_repo_on, git};

    #[test]
    fn builtin_protects_main_and_master() {
        let set = ProtectedBranchSet::builtin();
        assert!(set.contains("main"));
        assert!(set.contains("master"));
        assert!(!set.contains("feature/x"));
        assert_eq!(set.reason("main"), Some("always protected"));
    }

    #[test]
    fn detect_without_remote_is_builtin() {
        let repo = create_test_repo();
        let set = ProtectedBranchSet::detect(repo.path(), "origin", &[]);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["main", "master"]);
    }

    #[test]
    fn detect_adds_remote_default_branch() {
        let upstream = create_test_repo_on("trunk", 1);
        let clone = create_clone(upstream.path());

        assert_eq!(
            detect_default_branch(clone.path(), "origin").as_deref(),
            Some("trunk")
        );
        let set = ProtectedBranchSet::detect(clone.path(), "origin", &[]);
        assert!(set.contains("trunk"));
        assert_eq!(set.reason("trunk"), Some("default branch of remote 'origin'"));
    }

    #[test]
    fn detect_default_branch_with_ambiguous_local_name() {
        let upstream = create_test_repo_on("trunk", 1);
        let clone = create_clone(upstream.path());
        // A local branch spelled like the remote ref makes short names ambiguous.
        git(clone.path(), &["branch", "origin/trunk"]);

        assert_eq!(
            detect_default_branch(clone.path(), "origin").as_deref(),
            Some("trunk")
        );
    }

    #[test]
    fn detect_adds_configured_names() {
        let repo = create_test_repo();
        let extra = vec!["develop".to_string(), "main".to_string()];
        let set = ProtectedBranchSet::detect(repo.path(), "origin", &extra);
        assert!(set.contains("develop"));
        assert_eq!(set.reason("develop"), Some("listed in protected_branches"));
        // builtin reason wins for duplicates
        assert_eq!(set.reason("main"), Some("always protected"));
    }
}
