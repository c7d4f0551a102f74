//! git::handles
//!
//! Branch and tag handles, and the remote-ref capability they share.
//!
//! A handle names one local ref. Deleting it removes the local ref and
//! marks the handle, after which [`RemoteRef::push`] deletes the ref on
//! the remote instead of updating it.

use super::error::settle;
use super::{GitError, Repository, SyncOutcome};
use crate::core::refspec::{build_refspecs, RefKind, RefSpec};
use crate::core::types::{Oid, RefName};

/// A ref that can be deleted locally and pushed to the remote.
pub trait RemoteRef {
    /// The repository the ref lives in.
    fn repository(&self) -> &Repository;

    /// Fully qualified ref name.
    fn reference(&self) -> &RefName;

    fn kind(&self) -> RefKind;

    /// Whether [`RemoteRef::delete`] has run on this handle.
    fn is_deleted(&self) -> bool;

    /// Remove the local ref, without logging or marking the handle.
    fn remove_local(&self) -> Result<(), GitError>;

    /// Record that the local ref is gone.
    fn mark_deleted(&mut self);

    /// Refspecs a push of this ref uses.
    fn refspecs(&self) -> Vec<RefSpec> {
        build_refspecs(self.kind(), self.reference(), self.is_deleted())
    }

    /// Delete the local ref. A ref that is already gone counts as deleted.
    fn delete(&mut self) -> Result<(), GitError> {
        let result = delete_quietly(self);
        let operation = format!(
            "delete {}, name: {}",
            self.kind().label(),
            self.reference().short()
        );
        self.repository().finish(operation, result)
    }

    /// Push the ref, or its deletion, to the remote.
    fn push(&self) -> Result<SyncOutcome, GitError> {
        let result = settle(push_quietly(self));
        let operation = format!(
            "push {}, name: {}",
            self.kind().label(),
            self.reference().short()
        );
        self.repository().finish_sync(&operation, result)
    }
}

pub(crate) fn delete_quietly<R: RemoteRef + ?Sized>(handle: &mut R) -> Result<(), GitError> {
    match handle.remove_local() {
        Ok(()) | Err(GitError::NotFound { .. }) => {}
        Err(err) => return Err(err),
    }
    handle.mark_deleted();
    Ok(())
}

/// Push without logging; benign outcomes are still errors here.
pub(crate) fn push_quietly<R: RemoteRef + ?Sized>(handle: &R) -> Result<SyncOutcome, GitError> {
    let mut specs = handle.refspecs();
    if specs.is_empty() {
        specs.push(handle.repository().default_push_spec(handle.reference())?);
    }
    handle.repository().push_specs(&specs)
}

/// A local branch.
#[derive(Debug)]
pub struct BranchHandle<'r> {
    repo: &'r Repository,
    reference: RefName,
    deleted: bool,
}

impl<'r> BranchHandle<'r> {
    pub(crate) fn new(repo: &'r Repository, reference: RefName) -> Self {
        Self {
            repo,
            reference,
            deleted: false,
        }
    }

    /// Short branch name.
    pub fn name(&self) -> &str {
        self.reference.short()
    }

    /// The configured `branch.<name>.merge` ref, if any.
    pub fn merge_ref(&self) -> Option<RefName> {
        self.repo
            .raw()
            .branch_upstream_merge(self.reference.as_str())
            .ok()
            .and_then(|buf| buf.as_str().and_then(|s| RefName::new(s).ok()))
    }
}

impl RemoteRef for BranchHandle<'_> {
    fn repository(&self) -> &Repository {
        self.repo
    }

    fn reference(&self) -> &RefName {
        &self.reference
    }

    fn kind(&self) -> RefKind {
        RefKind::Branch
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn remove_local(&self) -> Result<(), GitError> {
        let mut branch = self
            .repo
            .raw()
            .find_branch(self.name(), git2::BranchType::Local)
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound => GitError::NotFound {
                    kind: "branch",
                    name: self.name().to_string(),
                },
                _ => GitError::from_git2(e, self.reference.as_str()),
            })?;
        branch
            .delete()
            .map_err(|e| GitError::from_git2(e, self.reference.as_str()))
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

/// A tag.
#[derive(Debug)]
pub struct TagHandle<'r> {
    repo: &'r Repository,
    reference: RefName,
    target: Option<Oid>,
    deleted: bool,
}

impl<'r> TagHandle<'r> {
    pub(crate) fn new(repo: &'r Repository, reference: RefName, target: Option<Oid>) -> Self {
        Self {
            repo,
            reference,
            target,
            deleted: false,
        }
    }

    /// Short tag name.
    pub fn name(&self) -> &str {
        self.reference.short()
    }

    /// Commit the tag points at, when known.
    pub fn target(&self) -> Option<&Oid> {
        self.target.as_ref()
    }
}

impl RemoteRef for TagHandle<'_> {
    fn repository(&self) -> &Repository {
        self.repo
    }

    fn reference(&self) -> &RefName {
        &self.reference
    }

    fn kind(&self) -> RefKind {
        RefKind::Tag
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn remove_local(&self) -> Result<(), GitError> {
        self.repo
            .raw()
            .tag_delete(self.name())
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound => GitError::NotFound {
                    kind: "tag",
                    name: self.name().to_string(),
                },
                _ => GitError::from_git2(e, self.reference.as_str()),
            })
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}
