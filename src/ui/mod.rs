//! ui
//!
//! Logging and terminal output.
//!
//! # Modules
//!
//! - [`output`] - Operation log lines, log sinks and CLI printing

pub mod output;
