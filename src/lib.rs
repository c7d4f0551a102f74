//! gitclerk - a thin facade over git2 for automation
//!
//! gitclerk clones a repository (to a directory or to a scratch location
//! that disappears with the handle), checks out branches and tags, edits
//! files, commits, and pushes branches and tags back, authenticating to SSH
//! remotes with a private key from the home directory.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface over a local working copy
//! - [`core`] - Domain types, ref naming, refspecs and configuration
//! - [`git`] - Client, repository and ref handles
//! - [`ui`] - Log lines, log sinks and terminal output
//!
//! # Behavior worth knowing
//!
//! 1. Checkout and pull refuse to run on a dirty worktree
//! 2. "Already up to date" and "non-fast-forward" are outcomes, not errors
//! 3. Every public operation logs exactly one line

pub mod cli;
pub mod core;
pub mod git;
pub mod ui;
