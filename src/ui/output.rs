//! ui::output
//!
//! Operation log lines and where they go.
//!
//! # Design
//!
//! Every mutating operation produces exactly one [`LogEntry`]: success or
//! failure, the operation with its arguments, and the HEAD it left behind.
//! Entries are handed to a [`LogSink`]. The default [`TracingSink`] forwards
//! them to `tracing`, so the embedding application decides where they end
//! up; [`MemorySink`] keeps rendered lines for inspection.

use std::fmt::{self, Display};
use std::sync::Mutex;

/// Prefix carried by every rendered line.
pub const LOG_PREFIX: &str = "[git]";

/// Output verbosity level for the command-line front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - failures only
    Quiet,
    /// Normal mode - one line per operation
    Normal,
    /// Debug mode - transfer progress as well
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// The most detailed `tracing` level shown at this verbosity.
    pub fn level(self) -> tracing::Level {
        match self {
            Verbosity::Quiet => tracing::Level::ERROR,
            Verbosity::Normal => tracing::Level::INFO,
            Verbosity::Debug => tracing::Level::DEBUG,
        }
    }
}

/// One operation's outcome, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Operation and its arguments, e.g. `checkout, want: refs/heads/main`.
    pub operation: String,
    /// HEAD annotation, e.g. `branch: main, hash: 1a2b...`.
    pub head: Option<String>,
    /// The error message when the operation failed.
    pub error: Option<String>,
}

impl LogEntry {
    pub fn success(operation: impl Into<String>, head: Option<String>) -> Self {
        Self {
            operation: operation.into(),
            head,
            error: None,
        }
    }

    pub fn failure(operation: impl Into<String>, head: Option<String>, error: impl Display) -> Self {
        Self {
            operation: operation.into(),
            head,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.is_success() { "success!" } else { "failed!" };
        write!(f, "{} {} {}", LOG_PREFIX, flag, self.operation)?;
        if let Some(head) = &self.head {
            write!(f, ", {}", head)?;
        }
        if let Some(error) = &self.error {
            write!(f, ", error: {}", error)?;
        }
        Ok(())
    }
}

/// Destination for operation log lines.
pub trait LogSink: Send + Sync {
    /// Record one finished operation.
    fn record(&self, entry: &LogEntry);

    /// Transfer progress during clone, fetch or push. Ignored by default.
    fn progress(&self, _message: &str) {}
}

/// Sends entries to `tracing`: successes at `info`, failures at `error`,
/// progress at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: &LogEntry) {
        if entry.is_success() {
            tracing::info!(target: "gitclerk", "{}", entry);
        } else {
            tracing::error!(target: "gitclerk", "{}", entry);
        }
    }

    fn progress(&self, message: &str) {
        tracing::debug!(target: "gitclerk", "{}", message);
    }
}

/// Keeps every rendered line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LogSink for MemorySink {
    fn record(&self, entry: &LogEntry) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.to_string());
    }
}

/// Print a message unless quiet.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
