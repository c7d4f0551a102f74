//! git::repository
//!
//! A working copy and every operation on it.
//!
//! # Logging
//!
//! Each public operation emits exactly one line through the client's
//! [`LogSink`](crate::ui::output::LogSink), annotated with the cached HEAD:
//!
//! ```text
//! [git] success! checkout, want: refs/heads/dev, branch: dev, hash: 4f2a...
//! [git] failed! pull, branch: main, hash: 9c1e..., error: working tree is dirty: 1 unstaged (a.txt)
//! ```
//!
//! # Concurrency
//!
//! Mutating operations take `&mut self`. A `Repository` may move between
//! threads but is not shared; open a second handle for parallel work.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Component, Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, PushOptions};
use serde::Serialize;
use tempfile::TempDir;

use super::error::settle;
use super::handles::{BranchHandle, RemoteRef, TagHandle};
use super::head::HeadState;
use super::ignore;
use super::status::WorktreeStatus;
use super::{Client, GitError, SyncOutcome};
use crate::core::naming::{qualify, resolve, Namespace};
use crate::core::refspec::RefSpec;
use crate::core::types::{Oid, RefName};

/// Push status messages that mean the remote has commits we lack.
const NON_FAST_FORWARD_MARKERS: [&str; 3] = ["non-fast-forward", "fetch first", "not fast forward"];

/// Commit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// An open working copy bound to a [`Client`].
pub struct Repository {
    // Declared before `scratch` so the engine handle closes before the
    // scratch directory is removed.
    repo: git2::Repository,
    root: PathBuf,
    client: Client,
    head: HeadState,
    scratch: Option<TempDir>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("head", &self.head)
            .field("ephemeral", &self.scratch.is_some())
            .finish()
    }
}

impl Repository {
    pub(crate) fn new(
        client: Client,
        repo: git2::Repository,
        scratch: Option<TempDir>,
    ) -> Result<Self, GitError> {
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        let root = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        let mut head = HeadState::default();
        if let Err(err) = head.refresh(&repo, None) {
            // Freshly cloned empty remotes have no HEAD yet.
            tracing::debug!(target: "gitclerk", root = %root.display(), "head not available: {}", err);
        }

        Ok(Self {
            repo,
            root,
            client,
            head,
            scratch,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// HEAD as of the last successful checkout, pull or commit.
    pub fn head(&self) -> &HeadState {
        &self.head
    }

    /// The client this repository was opened with.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Whether the working tree is deleted when this handle is dropped.
    pub fn is_ephemeral(&self) -> bool {
        self.scratch.is_some()
    }

    /// Effective `user.name` of this repository.
    pub fn user_name(&self) -> Option<String> {
        self.config_string("user.name")
    }

    /// Effective `user.email` of this repository.
    pub fn user_email(&self) -> Option<String> {
        self.config_string("user.email")
    }

    fn config_string(&self, key: &str) -> Option<String> {
        self.repo
            .config()
            .and_then(|config| config.get_string(key))
            .ok()
    }

    pub fn status(&self) -> Result<WorktreeStatus, GitError> {
        WorktreeStatus::read(&self.repo)
    }

    /// See [`WorktreeStatus::is_clean`].
    pub fn is_clean(&self) -> Result<bool, GitError> {
        Ok(self.status()?.is_clean())
    }

    /// Metadata of the commit HEAD points at.
    pub fn head_commit(&self) -> Result<CommitInfo, GitError> {
        let head = self.repo.head().map_err(head_error)?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(CommitInfo {
            oid: commit.id().into(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
        })
    }

    /// Close the repository and delete its working tree from disk.
    pub fn remove_all(self) -> Result<(), GitError> {
        let Repository {
            repo,
            root,
            client,
            head,
            scratch,
        } = self;
        drop(repo);

        let result = match scratch {
            Some(dir) => dir.close().map_err(|e| GitError::io(&root, e)),
            None => fs::remove_dir_all(&root).map_err(|e| GitError::io(&root, e)),
        };
        client.report(
            format!("remove all, dir: {}", root.display()),
            head.describe(),
            &result,
        );
        result
    }

    // ------------------------------------------------------------------
    // Checkout
    // ------------------------------------------------------------------

    /// Check out a local branch. An empty `name` means the branch HEAD is on.
    ///
    /// A branch that exists only on the remote is created locally, tracking
    /// the remote one. Refuses to run on a dirty worktree.
    pub fn checkout_branch(&mut self, name: &str) -> Result<(), GitError> {
        let result = self.checkout_branch_inner(name);
        let want = want_label(name, &result);
        self.finish(format!("checkout, want: {}", want), result.map(|_| ()))
    }

    fn checkout_branch_inner(&mut self, name: &str) -> Result<RefName, GitError> {
        self.status()?.require_clean()?;

        let tracking = Namespace::Remote(self.remote_name().to_string());
        let target = match name.strip_prefix(&tracking.prefix()) {
            Some(short) => qualify(&Namespace::Branch, short)?,
            None => resolve(&Namespace::Branch, name, || self.current_ref())?,
        };
        self.ensure_local_branch(&target)?;

        {
            let commit = self
                .repo
                .find_reference(target.as_str())
                .and_then(|r| r.peel_to_commit())
                .map_err(|e| GitError::from_git2(e, target.as_str()))?;
            self.repo
                .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
                .map_err(|e| GitError::from_git2(e, target.as_str()))?;
        }
        self.repo
            .set_head(target.as_str())
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        self.head.refresh(&self.repo, None)?;
        Ok(target)
    }

    /// Create `local` from its remote-tracking branch unless it exists.
    fn ensure_local_branch(&self, local: &RefName) -> Result<(), GitError> {
        if self.repo.find_reference(local.as_str()).is_ok() {
            return Ok(());
        }

        let short = local.short();
        let remote = self.remote_name();
        let tracking = qualify(&Namespace::Remote(remote.to_string()), short)?;
        let commit = match self.repo.find_reference(tracking.as_str()) {
            Ok(reference) => reference
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, tracking.as_str()))?,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(GitError::NotFound {
                    kind: "branch",
                    name: short.to_string(),
                })
            }
            Err(e) => return Err(GitError::from_git2(e, tracking.as_str())),
        };

        let mut branch = self
            .repo
            .branch(short, &commit, false)
            .map_err(|e| GitError::from_git2(e, local.as_str()))?;
        let upstream = format!("{}/{}", remote, short);
        branch
            .set_upstream(Some(upstream.as_str()))
            .map_err(|e| GitError::from_git2(e, local.as_str()))?;
        Ok(())
    }

    /// Check out a tag, detaching HEAD at the commit it points to.
    /// An empty `name` means the name HEAD is on.
    pub fn checkout_tag(&mut self, name: &str) -> Result<(), GitError> {
        let result = self.checkout_tag_inner(name);
        let want = want_label(name, &result);
        self.finish(format!("checkout, want: {}", want), result.map(|_| ()))
    }

    fn checkout_tag_inner(&mut self, name: &str) -> Result<RefName, GitError> {
        self.status()?.require_clean()?;

        let target = resolve(&Namespace::Tag, name, || self.current_ref())?;
        let commit_id = {
            let commit = self
                .repo
                .find_reference(target.as_str())
                .map_err(|e| not_found(e, "tag", &target))?
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, target.as_str()))?;
            self.repo
                .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
                .map_err(|e| GitError::from_git2(e, target.as_str()))?;
            commit.id()
        };
        self.repo
            .set_head_detached(commit_id)
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        self.head.refresh(&self.repo, Some(&target))?;
        Ok(target)
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Fast-forward the current branch from its upstream.
    ///
    /// Refuses to run on a dirty worktree. Being up to date, or having
    /// diverged from the upstream, is reported as a [`SyncOutcome`].
    pub fn pull(&mut self) -> Result<SyncOutcome, GitError> {
        let result = settle(self.pull_inner());
        self.finish_sync("pull", result)
    }

    fn pull_inner(&mut self) -> Result<SyncOutcome, GitError> {
        self.status()?.require_clean()?;
        let branch = self.current_branch("pull")?;
        settle(self.fetch_remote())?;

        let upstream = self.upstream_of(&branch)?;
        let target = {
            let upstream_ref = self
                .repo
                .find_reference(upstream.as_str())
                .map_err(|e| not_found(e, "branch", &upstream))?;
            let annotated = self
                .repo
                .reference_to_annotated_commit(&upstream_ref)
                .map_err(|e| GitError::from_git2(e, upstream.as_str()))?;
            let (analysis, _) = self
                .repo
                .merge_analysis(&[&annotated])
                .map_err(|e| GitError::from_git2(e, upstream.as_str()))?;

            if analysis.is_up_to_date() {
                return Err(GitError::AlreadyUpToDate);
            }
            if !analysis.is_fast_forward() {
                return Err(GitError::NonFastForward {
                    refname: branch.to_string(),
                });
            }
            annotated.id()
        };

        self.repo
            .find_reference(branch.as_str())
            .and_then(|mut r| r.set_target(target, &format!("pull: fast-forward to {}", target)))
            .map_err(|e| GitError::from_git2(e, branch.as_str()))?;
        self.repo
            .set_head(branch.as_str())
            .map_err(|e| GitError::from_git2(e, branch.as_str()))?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(|e| GitError::from_git2(e, branch.as_str()))?;

        self.head.refresh(&self.repo, None)?;
        Ok(SyncOutcome::Updated)
    }

    /// Update remote-tracking refs from the configured remote.
    pub fn fetch(&self) -> Result<SyncOutcome, GitError> {
        let result = settle(self.fetch_remote());
        self.finish_sync("fetch", result)
    }

    fn fetch_remote(&self) -> Result<SyncOutcome, GitError> {
        let session = self.client.auth().session();
        let updated = Cell::new(0usize);

        let mut callbacks = self.client.callbacks(&session);
        callbacks.update_tips(|_, _, _| {
            updated.set(updated.get() + 1);
            true
        });
        let mut options = self.client.fetch_options(callbacks);

        let mut remote = self.find_remote()?;
        let default_refspecs: [&str; 0] = [];
        remote
            .fetch(&default_refspecs, Some(&mut options), None)
            .map_err(|e| session.error(e, self.remote_name()))?;

        if updated.get() == 0 {
            return Err(GitError::AlreadyUpToDate);
        }
        Ok(SyncOutcome::Updated)
    }

    /// Push the current branch to its upstream.
    ///
    /// An already up-to-date remote, or one that has moved on
    /// (non-fast-forward), is reported as a [`SyncOutcome`].
    pub fn push(&self) -> Result<SyncOutcome, GitError> {
        let result = settle(self.push_current());
        self.finish_sync("push", result)
    }

    fn push_current(&self) -> Result<SyncOutcome, GitError> {
        let branch = self.current_branch("push")?;
        let spec = self.default_push_spec(&branch)?;
        self.push_specs(&[spec])
    }

    /// Push `specs` to the configured remote. Benign outcomes come back as
    /// errors; callers settle them.
    pub(crate) fn push_specs(&self, specs: &[RefSpec]) -> Result<SyncOutcome, GitError> {
        if specs.is_empty() {
            return Err(GitError::AlreadyUpToDate);
        }

        let session = self.client.auth().session();
        let noop = Cell::new(false);
        let rejected: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut callbacks = self.client.callbacks(&session);
        callbacks.push_negotiation(|updates| {
            noop.set(updates.iter().all(|u| u.src() == u.dst()));
            Ok(())
        });
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                rejected
                    .borrow_mut()
                    .get_or_insert_with(|| (refname.to_string(), message.to_string()));
            }
            Ok(())
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let specs: Vec<String> = specs.iter().map(ToString::to_string).collect();
        let mut remote = self.find_remote()?;
        remote
            .push(&specs, Some(&mut options))
            .map_err(|e| session.error(e, &specs.join(" ")))?;

        if let Some((refname, message)) = rejected.borrow_mut().take() {
            if NON_FAST_FORWARD_MARKERS.iter().any(|m| message.contains(m)) {
                return Err(GitError::NonFastForward { refname });
            }
            return Err(GitError::PushRejected { refname, message });
        }
        if noop.get() {
            return Err(GitError::AlreadyUpToDate);
        }
        Ok(SyncOutcome::Updated)
    }

    /// `local:<merge ref>`, where the merge ref is the configured upstream
    /// of `local` or `local` itself.
    pub(crate) fn default_push_spec(&self, local: &RefName) -> Result<RefSpec, GitError> {
        let dst = match self.repo.branch_upstream_merge(local.as_str()) {
            Ok(merge) => match merge.as_str() {
                Some(merge) => RefName::new(merge)?,
                None => local.clone(),
            },
            Err(e) if e.code() == ErrorCode::NotFound => local.clone(),
            Err(e) => return Err(GitError::from_git2(e, local.as_str())),
        };
        Ok(RefSpec::update(local.clone(), dst))
    }

    // ------------------------------------------------------------------
    // Index and commits
    // ------------------------------------------------------------------

    /// Stage `paths` (files or directories, relative to the root).
    pub fn add(&self, paths: &[&str]) -> Result<(), GitError> {
        let result = self.add_inner(paths);
        self.finish(format!("add, paths: {:?}", paths), result)
    }

    fn add_inner(&self, paths: &[&str]) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(|e| GitError::from_git2(e, "index"))?;
        index
            .add_all(paths.iter().copied(), git2::IndexAddOption::DEFAULT, None)
            .map_err(|e| GitError::from_git2(e, "index"))?;
        index.write().map_err(|e| GitError::from_git2(e, "index"))
    }

    /// Replace the content of `path` (relative to the root) and stage it.
    /// Missing parent directories are created.
    pub fn rewrite_file(&self, path: &str, data: &[u8]) -> Result<(), GitError> {
        let result = self.rewrite_file_inner(path, data);
        self.finish(format!("rewrite file, path: {}", path), result)
    }

    fn rewrite_file_inner(&self, path: &str, data: &[u8]) -> Result<(), GitError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || escapes {
            return Err(GitError::io(
                relative,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path must be relative to the worktree root",
                ),
            ));
        }

        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| GitError::io(parent, e))?;
        }
        fs::write(&full, data).map_err(|e| GitError::io(&full, e))?;

        let mut index = self.repo.index().map_err(|e| GitError::from_git2(e, "index"))?;
        let staged: PathBuf = relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        index
            .add_path(&staged)
            .map_err(|e| GitError::from_git2(e, path))?;
        index.write().map_err(|e| GitError::from_git2(e, "index"))
    }

    /// Commit the index on the current branch.
    ///
    /// Returns `None` when the index matches HEAD and nothing was committed.
    /// The identity comes from the client config, then from git config.
    pub fn commit(&mut self, message: &str) -> Result<Option<Oid>, GitError> {
        let result = self.commit_inner(message);
        let operation = match &result {
            Ok(None) => format!("commit, message: {:?} (nothing to commit)", message),
            _ => format!("commit, message: {:?}", message),
        };
        self.finish(operation, result)
    }

    fn commit_inner(&mut self, message: &str) -> Result<Option<Oid>, GitError> {
        let oid = {
            let mut index = self.repo.index().map_err(|e| GitError::from_git2(e, "index"))?;
            let tree_id = index
                .write_tree()
                .map_err(|e| GitError::from_git2(e, "index"))?;

            let parent = match self.repo.head() {
                Ok(head) => Some(
                    head.peel_to_commit()
                        .map_err(|e| GitError::from_git2(e, "HEAD"))?,
                ),
                Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
                Err(e) => return Err(GitError::from_git2(e, "HEAD")),
            };
            match &parent {
                Some(parent) if parent.tree_id() == tree_id => return Ok(None),
                None if index.is_empty() => return Ok(None),
                _ => {}
            }

            let tree = self
                .repo
                .find_tree(tree_id)
                .map_err(|e| GitError::from_git2(e, "tree"))?;
            let signature = self.signature()?;
            let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
            self.repo
                .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
                .map_err(|e| GitError::from_git2(e, "HEAD"))?
        };

        self.head.refresh(&self.repo, None)?;
        Ok(Some(oid.into()))
    }

    fn signature(&self) -> Result<git2::Signature<'static>, GitError> {
        if let Some((name, email)) = self.client.config().identity() {
            return git2::Signature::now(name, email)
                .map_err(|e| GitError::from_git2(e, "signature"));
        }
        self.repo.signature().map_err(|_| GitError::Internal {
            message: "no commit identity: set user_name and user_email".into(),
        })
    }

    // ------------------------------------------------------------------
    // Ignore rules
    // ------------------------------------------------------------------

    /// Append patterns to the root `.gitignore`. Returns how many were new.
    pub fn ignore(&self, patterns: &[&str]) -> Result<usize, GitError> {
        let result = ignore::append_patterns(&self.root, patterns);
        self.finish(format!("ignore, patterns: {:?}", patterns), result)
    }

    pub fn is_ignored_file(&self, path: &str) -> Result<bool, GitError> {
        let result = ignore::is_ignored(&self.repo, path, false);
        self.finish(format!("is ignored file, path: {}", path), result)
    }

    pub fn is_ignored_dir(&self, path: &str) -> Result<bool, GitError> {
        let result = ignore::is_ignored(&self.repo, path, true);
        self.finish(format!("is ignored dir, path: {}", path), result)
    }

    // ------------------------------------------------------------------
    // Branches
    // ------------------------------------------------------------------

    /// Handle to an existing local branch. An empty `name` means the
    /// branch HEAD is on.
    pub fn branch(&self, name: &str) -> Result<BranchHandle<'_>, GitError> {
        let result = self.branch_inner(name);
        self.finish(format!("branch, name: {}", name), result)
    }

    fn branch_inner(&self, name: &str) -> Result<BranchHandle<'_>, GitError> {
        let reference = resolve(&Namespace::Branch, name, || self.current_ref())?;
        self.repo
            .find_branch(reference.short(), BranchType::Local)
            .map_err(|e| not_found(e, "branch", &reference))?;
        Ok(BranchHandle::new(self, reference))
    }

    /// Create a local branch at `hash`, or at HEAD when `hash` is `None`,
    /// with the configured remote as its upstream.
    pub fn create_branch(&self, name: &str, hash: Option<&str>) -> Result<BranchHandle<'_>, GitError> {
        let result = self.create_branch_inner(name, hash);
        self.finish(format!("create branch, name: {}", name), result)
    }

    fn create_branch_inner(&self, name: &str, hash: Option<&str>) -> Result<BranchHandle<'_>, GitError> {
        let reference = resolve(&Namespace::Branch, name, || self.current_ref())?;
        let short = reference.short();
        let commit = self.target_commit(hash)?;

        self.repo
            .branch(short, &commit, false)
            .map_err(|e| exists(e, "branch", &reference))?;

        let mut config = self
            .repo
            .config()
            .map_err(|e| GitError::from_git2(e, "config"))?;
        config
            .set_str(&format!("branch.{}.remote", short), self.remote_name())
            .map_err(|e| GitError::from_git2(e, "config"))?;
        config
            .set_str(&format!("branch.{}.merge", short), reference.as_str())
            .map_err(|e| GitError::from_git2(e, "config"))?;

        Ok(BranchHandle::new(self, reference))
    }

    /// Delete a local branch.
    pub fn delete_local_branch(&self, name: &str) -> Result<(), GitError> {
        let result = self
            .branch_inner(name)
            .and_then(|mut handle| super::handles::delete_quietly(&mut handle));
        self.finish(format!("delete local branch, name: {}", name), result)
    }

    /// Delete a branch locally and on the remote.
    pub fn delete_branch(&self, name: &str) -> Result<SyncOutcome, GitError> {
        let result = resolve(&Namespace::Branch, name, || self.current_ref())
            .and_then(|reference| self.delete_everywhere(BranchHandle::new(self, reference)));
        self.finish_sync(&format!("delete branch, name: {}", name), result)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Handle to an existing tag. An empty `name` means the name HEAD is on.
    pub fn tag(&self, name: &str) -> Result<TagHandle<'_>, GitError> {
        let result = self.tag_inner(name);
        self.finish(format!("tag, name: {}", name), result)
    }

    fn tag_inner(&self, name: &str) -> Result<TagHandle<'_>, GitError> {
        let reference = resolve(&Namespace::Tag, name, || self.current_ref())?;
        let target = self
            .repo
            .find_reference(reference.as_str())
            .map_err(|e| not_found(e, "tag", &reference))?
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, reference.as_str()))?
            .id();
        Ok(TagHandle::new(self, reference, Some(target.into())))
    }

    /// Create a tag at `hash`, or at HEAD when `hash` is `None`.
    ///
    /// A non-empty `message` makes an annotated tag; an empty one a
    /// lightweight tag.
    pub fn create_tag(&self, name: &str, message: &str, hash: Option<&str>) -> Result<TagHandle<'_>, GitError> {
        let result = self.create_tag_inner(name, message, hash);
        self.finish(format!("create tag, name: {}", name), result)
    }

    fn create_tag_inner(&self, name: &str, message: &str, hash: Option<&str>) -> Result<TagHandle<'_>, GitError> {
        let reference = resolve(&Namespace::Tag, name, || self.current_ref())?;
        let short = reference.short();
        let commit = self.target_commit(hash)?;

        let created = if message.is_empty() {
            self.repo.tag_lightweight(short, commit.as_object(), false)
        } else {
            let tagger = self.signature()?;
            self.repo.tag(short, commit.as_object(), &tagger, message, false)
        };
        created.map_err(|e| exists(e, "tag", &reference))?;

        Ok(TagHandle::new(self, reference, Some(commit.id().into())))
    }

    /// Delete a local tag.
    pub fn delete_local_tag(&self, name: &str) -> Result<(), GitError> {
        let result = self
            .tag_inner(name)
            .and_then(|mut handle| super::handles::delete_quietly(&mut handle));
        self.finish(format!("delete local tag, name: {}", name), result)
    }

    /// Delete a tag locally and on the remote.
    pub fn delete_tag(&self, name: &str) -> Result<SyncOutcome, GitError> {
        let result = resolve(&Namespace::Tag, name, || self.current_ref())
            .and_then(|reference| self.delete_everywhere(TagHandle::new(self, reference, None)));
        self.finish_sync(&format!("delete tag, name: {}", name), result)
    }

    fn delete_everywhere<R: RemoteRef>(&self, mut handle: R) -> Result<SyncOutcome, GitError> {
        super::handles::delete_quietly(&mut handle)?;
        settle(super::handles::push_quietly(&handle))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn raw(&self) -> &git2::Repository {
        &self.repo
    }

    pub(crate) fn remote_name(&self) -> &str {
        &self.client.config().remote
    }

    fn find_remote(&self) -> Result<git2::Remote<'_>, GitError> {
        self.repo
            .find_remote(self.remote_name())
            .map_err(|e| match e.code() {
                ErrorCode::NotFound | ErrorCode::InvalidSpec => GitError::RemoteNotFound {
                    name: self.remote_name().to_string(),
                },
                _ => GitError::from_git2(e, self.remote_name()),
            })
    }

    /// The reference HEAD is on. A detached HEAD reports the tag it was
    /// checked out from, if any.
    fn current_ref(&self) -> Result<RefName, GitError> {
        let head = self.repo.head().map_err(head_error)?;
        if !head.is_branch() {
            if let Some(pinned) = self.head.reference().filter(|r| r.is_tag()) {
                return Ok(pinned.clone());
            }
        }
        Ok(RefName::new(head.name().unwrap_or("HEAD"))?)
    }

    /// The branch HEAD is on, or an error naming `operation`.
    fn current_branch(&self, operation: &'static str) -> Result<RefName, GitError> {
        let head = self.repo.head().map_err(head_error)?;
        if !head.is_branch() {
            return Err(GitError::DetachedHead { operation });
        }
        Ok(RefName::new(head.name().unwrap_or("HEAD"))?)
    }

    /// Remote-tracking ref that `branch` fast-forwards from.
    fn upstream_of(&self, branch: &RefName) -> Result<RefName, GitError> {
        match self.repo.branch_upstream_name(branch.as_str()) {
            Ok(name) => match name.as_str() {
                Some(name) => Ok(RefName::new(name)?),
                None => Err(GitError::InvalidRefName {
                    message: "upstream name is not valid UTF-8".into(),
                }),
            },
            Err(e) if e.code() == ErrorCode::NotFound => Ok(qualify(
                &Namespace::Remote(self.remote_name().to_string()),
                branch.short(),
            )?),
            Err(e) => Err(GitError::from_git2(e, branch.as_str())),
        }
    }

    /// The commit `hash` names, or HEAD's commit.
    fn target_commit(&self, hash: Option<&str>) -> Result<git2::Commit<'_>, GitError> {
        match hash.filter(|h| !h.is_empty()) {
            Some(hash) => {
                let oid = Oid::new(hash)?;
                let id = git2::Oid::from_str(oid.as_str())
                    .map_err(|_| GitError::InvalidOid { oid: hash.to_string() })?;
                self.repo.find_commit(id).map_err(|e| match e.code() {
                    ErrorCode::NotFound => GitError::NotFound {
                        kind: "commit",
                        name: hash.to_string(),
                    },
                    _ => GitError::from_git2(e, hash),
                })
            }
            None => self
                .repo
                .head()
                .map_err(head_error)?
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, "HEAD")),
        }
    }

    /// Log `result` and hand it back.
    pub(crate) fn finish<T>(&self, operation: String, result: Result<T, GitError>) -> Result<T, GitError> {
        self.client.report(operation, self.head.describe(), &result);
        result
    }

    pub(crate) fn finish_sync(
        &self,
        operation: &str,
        result: Result<SyncOutcome, GitError>,
    ) -> Result<SyncOutcome, GitError> {
        let operation = match &result {
            Ok(SyncOutcome::Updated) | Err(_) => operation.to_string(),
            Ok(outcome) => format!("{} ({})", operation, outcome.label()),
        };
        self.finish(operation, result)
    }
}

fn head_error(err: git2::Error) -> GitError {
    match err.code() {
        ErrorCode::UnbornBranch | ErrorCode::NotFound => GitError::NoHead,
        _ => GitError::from_git2(err, "HEAD"),
    }
}

fn not_found(err: git2::Error, kind: &'static str, reference: &RefName) -> GitError {
    match err.code() {
        ErrorCode::NotFound => GitError::NotFound {
            kind,
            name: reference.short().to_string(),
        },
        _ => GitError::from_git2(err, reference.as_str()),
    }
}

fn exists(err: git2::Error, kind: &'static str, reference: &RefName) -> GitError {
    match err.code() {
        ErrorCode::Exists => GitError::AlreadyExists {
            kind,
            name: reference.short().to_string(),
        },
        _ => GitError::from_git2(err, reference.as_str()),
    }
}

/// The resolved ref when known, else what the caller asked for.
fn want_label(name: &str, result: &Result<RefName, GitError>) -> String {
    match result {
        Ok(reference) => reference.to_string(),
        Err(_) if name.is_empty() => "HEAD".to_string(),
        Err(_) => name.to_string(),
    }
}
