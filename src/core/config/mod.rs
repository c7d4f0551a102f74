//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. `$GITCLERK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitclerk/config.toml`
//! 3. `~/.gitclerk/config.toml`
//!
//! When no file exists the defaults from [`ClientConfig::default`] apply.
//! Library users normally build a [`ClientConfig`] in code instead.
//!
//! # Example
//!
//! ```no_run
//! use gitclerk::core::config::load;
//!
//! let config = load().unwrap().config;
//! println!("remote: {}", config.remote);
//! ```

pub mod schema;

pub use schema::ClientConfig;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "GITCLERK_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded (and validated) configuration.
    pub config: ClientConfig,
    /// The file it came from, `None` when defaults were used.
    pub path: Option<PathBuf>,
}

/// Load configuration from the standard locations.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read, parsed or
/// validated. Missing files are not an error.
pub fn load() -> Result<ConfigLoadResult, ConfigError> {
    match find_config_file() {
        Some(path) => {
            let config = load_from(&path)?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: ClientConfig::default(),
            path: None,
        }),
    }
}

/// Read, parse and validate one config file.
pub fn load_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: ClientConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    config.validate()?;
    Ok(config)
}

/// The canonical per-user config location, `~/.gitclerk/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".gitclerk/config.toml"))
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_home).join("gitclerk/config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    default_config_path().ok().filter(|path| path.exists())
}
