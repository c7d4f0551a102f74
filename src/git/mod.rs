//! git
//!
//! Repository operations on top of `git2`.
//!
//! # Architecture
//!
//! - [`Client`] holds configuration, the lazily loaded SSH key and the log
//!   sink. It clones or opens working copies.
//! - [`Repository`] is one working copy. Checkout, pull, push, fetch,
//!   commit, branch and tag operations live here, each emitting one log
//!   line.
//! - [`BranchHandle`] and [`TagHandle`] name a single ref and share the
//!   [`RemoteRef`] capability: delete locally, then push.
//!
//! # Benign outcomes
//!
//! "Already up to date" and "non-fast-forward" never surface as errors
//! from pull, push, fetch or ref pushes; they come back as a
//! [`SyncOutcome`]. See [`settle`].
//!
//! # Example
//!
//! ```no_run
//! use gitclerk::core::config::ClientConfig;
//! use gitclerk::git::{Client, RemoteRef};
//!
//! let client = Client::new(ClientConfig::default().with_identity("bot", "bot@example.com"));
//! let mut repo = client.clone_ephemeral("git@github.com:example/deploy.git")?;
//! repo.checkout_branch("main")?;
//! repo.rewrite_file("values.yaml", b"replicas: 3\n")?;
//! repo.commit("scale to 3")?;
//! repo.push()?;
//! repo.create_tag("release-42", "", None)?.push()?;
//! # Ok::<(), gitclerk::git::GitError>(())
//! ```

mod auth;
mod client;
mod error;
mod handles;
mod head;
mod ignore;
mod repository;
mod status;

pub use auth::{SshAuth, SshKey};
pub use client::Client;
pub use error::{classify, settle, ErrorClass, GitError, SyncOutcome};
pub use handles::{BranchHandle, RemoteRef, TagHandle};
pub use head::HeadState;
pub use ignore::IGNORE_FILE;
pub use repository::{CommitInfo, Repository};
pub use status::WorktreeStatus;
