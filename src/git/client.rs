//! git::client
//!
//! Entry point: configuration, credentials and logging shared by every
//! repository handle created from it.
//!
//! There is no process-wide default instance. Build one [`Client`] and pass
//! it (or clones of it, which share state) to whatever needs git access.

use std::path::Path;
use std::sync::Arc;

use git2::{FetchOptions, RemoteCallbacks};

use super::auth::{CredentialSession, SshAuth, SshKey};
use super::{GitError, Repository};
use crate::core::config::ClientConfig;
use crate::ui::output::{LogEntry, LogSink, TracingSink};

/// Prefix for temporary clone directories.
const TEMP_PREFIX: &str = "gitclerk-";

/// Percentage step between transfer progress reports.
const PROGRESS_STEP: usize = 25;

struct ClientInner {
    config: ClientConfig,
    auth: SshAuth,
    sink: Arc<dyn LogSink>,
}

/// Creates repository handles.
///
/// Cloning a `Client` is cheap; clones share configuration, the cached SSH
/// key and the log sink.
///
/// # Example
///
/// ```no_run
/// use gitclerk::core::config::ClientConfig;
/// use gitclerk::git::Client;
///
/// let client = Client::new(ClientConfig::default().with_identity("bot", "bot@example.com"));
/// let mut repo = client.clone_ephemeral("git@github.com:example/config.git")?;
/// repo.checkout_branch("")?;
/// # Ok::<(), gitclerk::git::GitError>(())
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Client {
    /// Client that logs through `tracing`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Client with a custom log sink.
    pub fn with_sink(config: ClientConfig, sink: Arc<dyn LogSink>) -> Self {
        let auth = SshAuth::new(config.ssh_key.clone());
        Self {
            inner: Arc::new(ClientInner { config, auth, sink }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The SSH key, loading it now if no remote has asked for it yet.
    pub fn ssh_key(&self) -> Result<&SshKey, GitError> {
        let result = self.inner.auth.key();
        let path = match &result {
            Ok(key) => key.path().display().to_string(),
            Err(_) => self.inner.config.ssh_key.display().to_string(),
        };
        self.report(format!("auth, path: {}", path), None, &result);
        result
    }

    /// Clone `url` into `dir`, or into a new temporary directory that is
    /// left in place (see [`Repository::root`] and [`Repository::remove_all`]).
    pub fn clone_to_dir(&self, url: &str, dir: Option<&Path>) -> Result<Repository, GitError> {
        let result = self.clone_to_dir_inner(url, dir);
        let shown = match (&result, dir) {
            (Ok(repo), _) => repo.root().display().to_string(),
            (Err(_), Some(dir)) => dir.display().to_string(),
            (Err(_), None) => "<temp>".to_string(),
        };
        let head = result.as_ref().ok().and_then(|repo| repo.head().describe());
        self.report(
            format!("clone to dir, url: {}, dir: {}", url, shown),
            head,
            &result,
        );
        result
    }

    fn clone_to_dir_inner(&self, url: &str, dir: Option<&Path>) -> Result<Repository, GitError> {
        if let Some(dir) = dir {
            let repo = self.clone_raw(url, dir)?;
            return Repository::new(self.clone(), repo, None);
        }

        // The guard removes the directory unless the clone fully succeeds.
        let scratch = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| GitError::io(std::env::temp_dir(), e))?;
        let repo = self.clone_raw(url, scratch.path())?;
        let repo = Repository::new(self.clone(), repo, None)?;
        let _ = scratch.keep();
        Ok(repo)
    }

    /// Clone `url` into a scratch directory owned by the returned handle.
    ///
    /// The directory is removed when the handle is dropped.
    pub fn clone_ephemeral(&self, url: &str) -> Result<Repository, GitError> {
        let result = self.clone_ephemeral_inner(url);
        let head = result.as_ref().ok().and_then(|repo| repo.head().describe());
        self.report(format!("clone ephemeral, url: {}", url), head, &result);
        result
    }

    fn clone_ephemeral_inner(&self, url: &str) -> Result<Repository, GitError> {
        let scratch = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| GitError::io(std::env::temp_dir(), e))?;
        let repo = self.clone_raw(url, scratch.path())?;
        Repository::new(self.clone(), repo, Some(scratch))
    }

    /// Wrap an existing working copy. `path` may be any directory inside it.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(&self, path: &Path) -> Result<Repository, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Repository::new(self.clone(), repo, None)
    }

    fn clone_raw(&self, url: &str, dir: &Path) -> Result<git2::Repository, GitError> {
        let session = self.inner.auth.session();
        let repo = git2::build::RepoBuilder::new()
            .fetch_options(self.fetch_options(self.callbacks(&session)))
            .clone(url, dir)
            .map_err(|e| session.error(e, url))?;

        self.apply_identity(&repo)?;
        Ok(repo)
    }

    /// Write the configured identity into the clone's local config.
    fn apply_identity(&self, repo: &git2::Repository) -> Result<(), GitError> {
        let mut config = repo
            .config()
            .map_err(|e| GitError::from_git2(e, "config"))?;
        let settings = [
            ("user.name", self.inner.config.user_name.as_deref()),
            ("user.email", self.inner.config.user_email.as_deref()),
        ];
        for (key, value) in settings {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                config
                    .set_str(key, value)
                    .map_err(|e| GitError::from_git2(e, key))?;
            }
        }
        Ok(())
    }

    /// Fetch options around `callbacks`, with the configured depth.
    pub(crate) fn fetch_options<'a>(&self, callbacks: RemoteCallbacks<'a>) -> FetchOptions<'a> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        if self.inner.config.depth > 0 {
            options.depth(i32::try_from(self.inner.config.depth).unwrap_or(i32::MAX));
        }
        options
    }

    /// Remote callbacks wired to the credential session and the log sink.
    pub(crate) fn callbacks<'a>(&'a self, session: &'a CredentialSession<'a>) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            session.credentials(url, username, allowed)
        });

        let sink: &'a dyn LogSink = self.inner.sink.as_ref();
        let mut last_step = None;
        callbacks.transfer_progress(move |stats| {
            let total = stats.total_objects();
            if total > 0 {
                let step = stats.received_objects() * 100 / total / PROGRESS_STEP;
                if last_step != Some(step) {
                    last_step = Some(step);
                    sink.progress(&format!(
                        "received {}/{} objects, {} bytes",
                        stats.received_objects(),
                        total,
                        stats.received_bytes()
                    ));
                }
            }
            true
        });
        callbacks
    }

    pub(crate) fn auth(&self) -> &SshAuth {
        &self.inner.auth
    }

    /// Emit the one log line for a finished operation.
    pub(crate) fn report<T>(
        &self,
        operation: impl Into<String>,
        head: Option<String>,
        result: &Result<T, GitError>,
    ) {
        let entry = match result {
            Ok(_) => LogEntry::success(operation, head),
            Err(err) => LogEntry::failure(operation, head, err),
        };
        self.inner.sink.record(&entry);
    }
}
