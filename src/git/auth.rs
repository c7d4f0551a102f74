//! git::auth
//!
//! SSH key authentication.
//!
//! The private key is read lazily, the first time a remote actually asks
//! for SSH credentials, and at most once per [`SshAuth`]: the outcome
//! (key or failure) is cached in a `OnceLock`, so concurrent first use
//! cannot load it twice and a missing key keeps failing the same way.
//! Remotes reached over a local path or anonymous HTTPS never touch it.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use git2::{Cred, CredentialType};

use super::GitError;

/// User name sent when the URL does not carry one.
const DEFAULT_SSH_USER: &str = "git";

/// Credential requests tolerated per remote operation before giving up.
/// libgit2 keeps asking while the server rejects what it was given.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// A loaded private key.
pub struct SshKey {
    path: PathBuf,
    private_key: String,
}

impl SshKey {
    /// Where the key was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn credential(&self, username: &str) -> Result<Cred, git2::Error> {
        Cred::ssh_key_from_memory(username, None, &self.private_key, None)
    }
}

impl std::fmt::Debug for SshKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshKey").field("path", &self.path).finish()
    }
}

#[derive(Debug, Clone)]
struct LoadFailure {
    path: PathBuf,
    message: String,
}

impl From<&LoadFailure> for GitError {
    fn from(failure: &LoadFailure) -> Self {
        GitError::Auth {
            path: failure.path.clone(),
            message: failure.message.clone(),
        }
    }
}

/// Lazily loaded SSH key material for one client.
#[derive(Debug)]
pub struct SshAuth {
    configured: PathBuf,
    cached: OnceLock<Result<SshKey, LoadFailure>>,
}

impl SshAuth {
    pub fn new(configured: impl Into<PathBuf>) -> Self {
        Self {
            configured: configured.into(),
            cached: OnceLock::new(),
        }
    }

    /// The key, loading it on first use.
    ///
    /// # Errors
    ///
    /// [`GitError::Auth`] if the key file is missing, unreadable or not a
    /// private key. The failure is cached like a success would be.
    pub fn key(&self) -> Result<&SshKey, GitError> {
        self.cached
            .get_or_init(|| load_key(&self.configured, dirs::home_dir()))
            .as_ref()
            .map_err(GitError::from)
    }

    /// Per-operation credential state for remote callbacks.
    pub(crate) fn session(&self) -> CredentialSession<'_> {
        CredentialSession {
            auth: self,
            attempts: Cell::new(0),
            failure: RefCell::new(None),
        }
    }
}

/// Resolve the configured key path: relative paths live under `home`.
fn resolve_key_path(configured: &Path, home: Option<PathBuf>) -> Result<PathBuf, LoadFailure> {
    if configured.is_absolute() {
        return Ok(configured.to_path_buf());
    }
    match home {
        Some(home) => Ok(home.join(configured)),
        None => Err(LoadFailure {
            path: configured.to_path_buf(),
            message: "home directory not found".into(),
        }),
    }
}

fn load_key(configured: &Path, home: Option<PathBuf>) -> Result<SshKey, LoadFailure> {
    let path = resolve_key_path(configured, home)?;
    let fail = |message: String| LoadFailure {
        path: path.clone(),
        message,
    };

    if !path.is_file() {
        return Err(fail("key file not found".into()));
    }
    let private_key =
        std::fs::read_to_string(&path).map_err(|e| fail(format!("cannot read key: {e}")))?;
    if !private_key.contains("PRIVATE KEY-----") {
        return Err(fail("file is not a PEM or OpenSSH private key".into()));
    }

    Ok(SshKey { path, private_key })
}

/// Credential state for a single clone, fetch or push.
///
/// Remembers an authentication failure raised inside the callback so the
/// operation can report it as [`GitError::Auth`] instead of the engine's
/// generic transport error.
pub(crate) struct CredentialSession<'a> {
    auth: &'a SshAuth,
    attempts: Cell<u32>,
    failure: RefCell<Option<GitError>>,
}

impl CredentialSession<'_> {
    /// Body of `RemoteCallbacks::credentials`.
    pub(crate) fn credentials(
        &self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        let username = username_from_url.unwrap_or(DEFAULT_SSH_USER);

        if attempt > MAX_CREDENTIAL_ATTEMPTS {
            let path = self
                .auth
                .key()
                .map(|key| key.path().to_path_buf())
                .unwrap_or_else(|_| self.auth.configured.clone());
            return Err(self.fail(GitError::Auth {
                path,
                message: format!("credentials rejected by {url}"),
            }));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            match self.auth.key() {
                Ok(key) => key.credential(username),
                Err(err) => Err(self.fail(err)),
            }
        } else if allowed.contains(CredentialType::USERNAME) {
            Cred::username(username)
        } else {
            Cred::default()
        }
    }

    fn fail(&self, err: GitError) -> git2::Error {
        let message = err.to_string();
        *self.failure.borrow_mut() = Some(err);
        git2::Error::new(git2::ErrorCode::Auth, git2::ErrorClass::Ssh, message)
    }

    /// Turn an engine error into a [`GitError`], preferring a recorded
    /// authentication failure.
    pub(crate) fn error(&self, err: git2::Error, context: &str) -> GitError {
        self.failure
            .borrow_mut()
            .take()
            .unwrap_or_else(|| GitError::from_git2(err, context))
    }
}
