//! git::error
//!
//! Typed failures for every repository operation.
//!
//! # Benign outcomes
//!
//! Two engine results are not failures from a caller's point of view:
//! the remote already matching ([`GitError::AlreadyUpToDate`]) and a
//! non-fast-forward update ([`GitError::NonFastForward`]). Operations
//! produce them internally and [`settle`] turns them into a
//! [`SyncOutcome`] at the public boundary, so retrying a pull or push is
//! always safe. [`classify`] is the single place that decides which
//! errors are benign.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::TypeError;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The SSH key could not be loaded or was rejected.
    #[error("authentication failed ({path}): {message}")]
    Auth {
        /// Resolved key path
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Working tree has uncommitted changes.
    #[error("working tree is dirty: {details}")]
    DirtyWorktree {
        /// Description of what's dirty
        details: String,
    },

    /// HEAD is unborn (no commits yet).
    #[error("no HEAD available: repository has no commits")]
    NoHead,

    /// HEAD is detached where a branch is required.
    #[error("HEAD is detached; {operation} needs a checked-out branch")]
    DetachedHead {
        /// The operation that needed a branch
        operation: &'static str,
    },

    /// Branch, tag or object does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// "branch", "tag", "object", ...
        kind: &'static str,
        /// What was looked up
        name: String,
    },

    /// Branch or tag already exists.
    #[error("{kind} already exists: {name}")]
    AlreadyExists {
        /// "branch" or "tag"
        kind: &'static str,
        /// The conflicting name
        name: String,
    },

    /// The configured remote is missing.
    #[error("remote not found: {name}")]
    RemoteNotFound {
        /// The remote name
        name: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Nothing to do: local and remote already agree.
    #[error("already up to date")]
    AlreadyUpToDate,

    /// The update is not a fast-forward.
    #[error("non-fast-forward update: {refname}")]
    NonFastForward {
        /// The ref that could not be fast-forwarded
        refname: String,
    },

    /// The remote refused a pushed ref.
    #[error("remote rejected {refname}: {message}")]
    PushRejected {
        /// The ref that was rejected
        refname: String,
        /// Reason reported by the remote
        message: String,
    },

    /// Filesystem error in the working copy.
    #[error("i/o error at {path}: {source}")]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Any other engine error, passed through.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Map a git2 error onto a typed variant, with `context` naming the
    /// object the operation was working on.
    pub(crate) fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::NotFound {
                kind: if context.starts_with("refs/") {
                    "ref"
                } else {
                    "object"
                },
                name: context.to_string(),
            },
            git2::ErrorCode::UnbornBranch => GitError::NoHead,
            git2::ErrorCode::Exists => GitError::AlreadyExists {
                kind: "ref",
                name: context.to_string(),
            },
            git2::ErrorCode::NotFastForward => GitError::NonFastForward {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidRefName {
                message: format!("{}: {}", context, err.message()),
            },
            git2::ErrorCode::Uncommitted | git2::ErrorCode::Conflict => {
                GitError::DirtyWorktree {
                    details: err.message().to_string(),
                }
            }
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::UnbornBranch => GitError::NoHead,
            git2::ErrorCode::NotFastForward => GitError::NonFastForward {
                refname: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) | TypeError::InvalidShortName(msg) => {
                GitError::InvalidRefName { message: msg }
            }
        }
    }
}

/// How an error is treated at the public boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Local and remote already agree.
    UpToDate,
    /// A non-fast-forward update that is deliberately skipped.
    NonFastForward,
    /// A real failure, returned to the caller.
    Fatal,
}

/// Classify an error.
///
/// # Example
///
/// ```
/// use gitclerk::git::{classify, ErrorClass, GitError};
///
/// assert_eq!(classify(&GitError::AlreadyUpToDate), ErrorClass::UpToDate);
/// assert_eq!(classify(&GitError::NoHead), ErrorClass::Fatal);
/// ```
pub fn classify(err: &GitError) -> ErrorClass {
    match err {
        GitError::AlreadyUpToDate => ErrorClass::UpToDate,
        GitError::NonFastForward { .. } => ErrorClass::NonFastForward,
        _ => ErrorClass::Fatal,
    }
}

/// What a successful pull, push or fetch actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Refs or files were updated.
    Updated,
    /// Nothing needed to change.
    UpToDate,
    /// A non-fast-forward update was skipped.
    NonFastForwardSkipped,
}

impl SyncOutcome {
    /// Short label for log lines.
    pub fn label(self) -> &'static str {
        match self {
            SyncOutcome::Updated => "updated",
            SyncOutcome::UpToDate => "already up to date",
            SyncOutcome::NonFastForwardSkipped => "non-fast-forward skipped",
        }
    }
}

/// Downgrade benign errors to a successful [`SyncOutcome`].
///
/// Every other error passes through unchanged.
pub fn settle(result: Result<SyncOutcome, GitError>) -> Result<SyncOutcome, GitError> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => match classify(&err) {
            ErrorClass::UpToDate => Ok(SyncOutcome::UpToDate),
            ErrorClass::NonFastForward => Ok(SyncOutcome::NonFastForwardSkipped),
            ErrorClass::Fatal => Err(err),
        },
    }
}
