//! core::config::schema
//!
//! Client configuration schema.
//!
//! # Example
//!
//! ```toml
//! ssh_key = ".ssh/id_ed25519"
//! user_name = "release-bot"
//! user_email = "release-bot@example.com"
//! depth = 1
//! remote = "origin"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default private key, relative to the home directory.
pub const DEFAULT_SSH_KEY: &str = ".ssh/id_rsa";

/// Default remote name.
pub const DEFAULT_REMOTE: &str = "origin";

/// Options for a [`crate::git::Client`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Private key used for SSH remotes. Relative paths are resolved
    /// against the home directory.
    pub ssh_key: PathBuf,

    /// Written to `user.name` of every clone, and used as commit identity.
    pub user_name: Option<String>,

    /// Written to `user.email` of every clone, and used as commit identity.
    pub user_email: Option<String>,

    /// History depth for clone, fetch and pull. `0` fetches everything.
    pub depth: u32,

    /// Remote that push, pull and fetch talk to.
    pub remote: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ssh_key: PathBuf::from(DEFAULT_SSH_KEY),
            user_name: None,
            user_email: None,
            depth: 1,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Use a different private key.
    pub fn with_ssh_key(mut self, path: impl AsRef<Path>) -> Self {
        self.ssh_key = path.as_ref().to_path_buf();
        self
    }

    /// Set the identity written into clones and used for commits.
    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self.user_email = Some(email.into());
        self
    }

    /// Set the history depth (`0` for full history).
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Talk to a remote other than `origin`.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Both halves of the identity, if both are set and non-empty.
    pub fn identity(&self) -> Option<(&str, &str)> {
        match (self.user_name.as_deref(), self.user_email.as_deref()) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Some((name, email))
            }
            _ => None,
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "remote name cannot be empty".into(),
            ));
        }
        if self.remote.contains(char::is_whitespace) || self.remote.contains('/') {
            return Err(ConfigError::InvalidValue(format!(
                "invalid remote name '{}'",
                self.remote
            )));
        }
        if let Some(email) = &self.user_email {
            if !email.is_empty() && !email.contains('@') {
                return Err(ConfigError::InvalidValue(format!(
                    "user_email '{}' is not an email address",
                    email
                )));
            }
        }
        if self.ssh_key.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("ssh_key cannot be empty".into()));
        }
        Ok(())
    }
}
