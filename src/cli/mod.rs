//! cli
//!
//! Command-line interface over a local working copy.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load the client configuration and set up logging
//! - Delegate to command handlers, which call [`crate::git`]

pub mod args;
pub mod commands;

pub use args::Cli;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::{self, ClientConfig};
use crate::git::{Client, Repository};
use crate::ui::output::Verbosity;

/// Everything a command handler needs.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory commands run in
    pub cwd: PathBuf,
    pub verbosity: Verbosity,
    pub config: ClientConfig,
}

impl Context {
    /// A client for this invocation.
    pub fn client(&self) -> Client {
        Client::new(self.config.clone())
    }

    /// Open the working copy containing `cwd`.
    pub fn open(&self) -> Result<Repository> {
        self.client()
            .open(&self.cwd)
            .with_context(|| format!("opening repository at {}", self.cwd.display()))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_logging(verbosity);

    let loaded = config::load().context("loading configuration")?;
    if let Some(path) = &loaded.path {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }
    let mut config = loaded.config;
    if let Some(key) = cli.key {
        config = config.with_ssh_key(key);
    }

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("reading current directory")?,
    };
    let ctx = Context {
        cwd,
        verbosity,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Log lines go to stderr so command output on stdout stays parseable.
fn init_logging(verbosity: Verbosity) {
    let result = tracing_subscriber::fmt()
        .with_max_level(verbosity.level())
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
