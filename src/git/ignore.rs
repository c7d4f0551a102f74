//! git::ignore
//!
//! `.gitignore` maintenance and ignore queries.
//!
//! Queries go through the engine, so the full ignore stack applies:
//! `.gitignore` files, `.git/info/exclude` and the global excludes file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::GitError;

/// Name of the ignore file maintained at the worktree root.
pub const IGNORE_FILE: &str = ".gitignore";

const COMMENT_PREFIX: &str = "#";

/// Append `patterns` to the root `.gitignore`, skipping any already present.
///
/// Existing content is preserved verbatim. Returns the number of patterns
/// actually added.
pub(crate) fn append_patterns(workdir: &Path, patterns: &[&str]) -> Result<usize, GitError> {
    let path = workdir.join(IGNORE_FILE);
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(GitError::io(&path, e)),
    };

    let mut known: HashSet<&str> = existing
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.starts_with(COMMENT_PREFIX))
        .collect();

    let mut content = existing.clone();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }

    let mut added = 0;
    for pattern in patterns {
        let pattern = pattern.trim_end();
        if pattern.trim().is_empty() || !known.insert(pattern) {
            continue;
        }
        content.push_str(pattern);
        content.push('\n');
        added += 1;
    }

    if added > 0 {
        fs::write(&path, content).map_err(|e| GitError::io(&path, e))?;
    }
    Ok(added)
}

/// Whether `path` (relative to the worktree root) is ignored.
pub(crate) fn is_ignored(
    repo: &git2::Repository,
    path: &str,
    is_dir: bool,
) -> Result<bool, GitError> {
    let path = path.trim_start_matches("./");
    let query = match (is_dir, path.ends_with('/')) {
        (true, false) => format!("{path}/"),
        _ => path.to_string(),
    };
    repo.is_path_ignored(&query)
        .map_err(|e| GitError::from_git2(e, &query))
}
