//! git::status
//!
//! Working tree status and the clean-worktree guard.
//!
//! Checkout and pull would silently clobber or merge uncommitted work, so
//! both refuse to run unless the worktree is clean. "Clean" here means no
//! staged or unstaged change to a tracked file and no untracked file that
//! is neither ignored nor hidden (a file name starting with `.`).

use std::path::Path;

use super::GitError;

/// How many offending paths a `DirtyWorktree` error lists.
const MAX_REPORTED_PATHS: usize = 5;

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked, non-ignored, non-hidden files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
    /// Paths that make the worktree dirty
    pub paths: Vec<String>,
}

impl WorktreeStatus {
    /// Read the status of `repo`'s working tree.
    pub(crate) fn read(repo: &git2::Repository) -> Result<Self, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();
            let path = entry.path().unwrap_or_default();

            if status.is_wt_new() && !status.is_index_new() {
                if is_hidden(path) {
                    continue;
                }
                result.untracked += 1;
                result.paths.push(path.to_string());
                continue;
            }

            let mut dirty = false;
            if status.is_conflicted() {
                result.has_conflicts = true;
                dirty = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
                dirty = true;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
                dirty = true;
            }
            if dirty {
                result.paths.push(path.to_string());
            }
        }

        Ok(result)
    }

    /// No staged, unstaged, conflicted or (visible) untracked paths.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0 && !self.has_conflicts
    }

    /// Check if there are any staged changes ready to commit.
    pub fn has_staged(&self) -> bool {
        self.staged > 0
    }

    /// Fail with [`GitError::DirtyWorktree`] unless clean.
    pub fn require_clean(&self) -> Result<(), GitError> {
        if self.is_clean() {
            return Ok(());
        }
        Err(GitError::DirtyWorktree {
            details: self.details(),
        })
    }

    fn details(&self) -> String {
        let mut parts = Vec::new();
        if self.staged > 0 {
            parts.push(format!("{} staged", self.staged));
        }
        if self.unstaged > 0 {
            parts.push(format!("{} unstaged", self.unstaged));
        }
        if self.untracked > 0 {
            parts.push(format!("{} untracked", self.untracked));
        }
        if self.has_conflicts {
            parts.push("conflicts".to_string());
        }
        let mut details = parts.join(", ");
        if !self.paths.is_empty() {
            let shown: Vec<&str> = self
                .paths
                .iter()
                .take(MAX_REPORTED_PATHS)
                .map(String::as_str)
                .collect();
            details.push_str(&format!(" ({})", shown.join(", ")));
            if self.paths.len() > MAX_REPORTED_PATHS {
                details.push_str(&format!(" and {} more", self.paths.len() - MAX_REPORTED_PATHS));
            }
        }
        details
    }
}

/// Whether the file name of `path` starts with a dot.
fn is_hidden(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        let status = WorktreeStatus::default();
        assert!(status.is_clean());
        assert!(!status.has_staged());
        assert!(status.require_clean().is_ok());
    }

    #[test]
    fn staged_changes_are_dirty() {
        let status = WorktreeStatus {
            staged: 2,
            paths: vec!["a.txt".into(), "b.txt".into()],
            ..Default::default()
        };
        assert!(status.has_staged());
        let err = status.require_clean().unwrap_err();
        assert_eq!(
            err.to_string(),
            "working tree is dirty: 2 staged (a.txt, b.txt)"
        );
    }

    #[test]
    fn untracked_files_are_dirty() {
        let status = WorktreeStatus {
            untracked: 1,
            ..Default::default()
        };
        assert!(!status.is_clean());
    }

    #[test]
    fn conflicts_are_dirty() {
        let status = WorktreeStatus {
            has_conflicts: true,
            ..Default::default()
        };
        assert!(matches!(
            status.require_clean(),
            Err(GitError::DirtyWorktree { .. })
        ));
    }

    #[test]
    fn long_path_lists_are_truncated() {
        let status = WorktreeStatus {
            unstaged: 7,
            paths: (0..7).map(|i| format!("f{i}")).collect(),
            ..Default::default()
        };
        assert!(status.details().ends_with("and 2 more"));
    }

    #[test]
    fn hidden_detection() {
        assert!(is_hidden(".env"));
        assert!(is_hidden("config/.secrets"));
        assert!(!is_hidden("src/main.rs"));
        assert!(!is_hidden(".github/workflows/ci.yml"));
    }
}
