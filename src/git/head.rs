//! git::head
//!
//! Cached view of HEAD used to annotate log lines.
//!
//! The cache is owned by one [`crate::git::Repository`] and is refreshed
//! only after a successful checkout, pull or commit. Everything else reads
//! it as-is.

use serde::Serialize;

use super::GitError;
use crate::core::types::{Oid, RefName};

/// Last observed HEAD: commit and reference name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadState {
    oid: Option<Oid>,
    reference: Option<RefName>,
}

impl HeadState {
    /// Read HEAD from the repository and store it.
    ///
    /// When HEAD is detached, `detached_as` names the ref that was checked
    /// out (a tag), so annotations keep saying `tag: v1` rather than `HEAD`.
    ///
    /// # Errors
    ///
    /// [`GitError::NoHead`] if the repository has no commits yet. The
    /// cached state is left untouched on error.
    pub(crate) fn refresh(
        &mut self,
        repo: &git2::Repository,
        detached_as: Option<&RefName>,
    ) -> Result<(), GitError> {
        let head = repo.head().map_err(|e| match e.code() {
            git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound => GitError::NoHead,
            _ => GitError::from_git2(e, "HEAD"),
        })?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let reference = match (head.is_branch(), detached_as) {
            (false, Some(pinned)) => pinned.clone(),
            _ => RefName::new(head.name().unwrap_or("HEAD"))?,
        };

        self.oid = Some(commit.id().into());
        self.reference = Some(reference);
        Ok(())
    }

    /// Commit HEAD pointed at when last refreshed.
    pub fn oid(&self) -> Option<&Oid> {
        self.oid.as_ref()
    }

    /// Reference HEAD was on when last refreshed.
    pub fn reference(&self) -> Option<&RefName> {
        self.reference.as_ref()
    }

    /// `branch: main, hash: <oid>` or `tag: v1, hash: <oid>`.
    ///
    /// `None` before the first successful refresh.
    pub fn describe(&self) -> Option<String> {
        let reference = self.reference.as_ref()?;
        let kind = if reference.is_tag() { "tag" } else { "branch" };
        let hash = self.oid.as_ref().map(Oid::as_str).unwrap_or("-");
        Some(format!("{}: {}, hash: {}", kind, reference.short(), hash))
    }
}
