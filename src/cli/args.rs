//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--key <path>`: SSH private key, overriding the config file
//! - `--debug`: Show transfer progress
//! - `--quiet` / `-q`: Failures only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitclerk - clone, commit, branch, tag and push with an SSH key
#[derive(Parser, Debug)]
#[command(name = "gitclerk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitclerk was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// SSH private key (relative paths are under the home directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Show transfer progress
    #[arg(long, global = true)]
    pub debug: bool,

    /// Failures only
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone a repository
    #[command(after_help = "\
EXAMPLES:
    gitclerk clone git@github.com:example/deploy.git deploy
    gitclerk clone git@github.com:example/deploy.git      # into a temp dir")]
    Clone {
        /// Remote URL (ssh, https or a local path)
        url: String,

        /// Target directory; a new temporary directory when omitted
        dir: Option<PathBuf>,
    },

    /// Check out a branch, or a tag with --tag
    Checkout {
        /// Branch or tag name; the current one when omitted
        #[arg(default_value = "")]
        name: String,

        /// Treat NAME as a tag and detach HEAD at it
        #[arg(long)]
        tag: bool,
    },

    /// Fast-forward the current branch from its upstream
    Pull,

    /// Push the current branch to its upstream
    Push,

    /// Update remote-tracking branches
    Fetch,

    /// Stage files or directories
    Add {
        /// Paths relative to the repository root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Commit the index
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Stage every change first
        #[arg(short, long)]
        all: bool,
    },

    /// Replace a file's content and stage it
    Write {
        /// Path relative to the repository root
        path: String,

        /// Read the new content from this file instead of stdin
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Create, delete or push branches
    Branch {
        #[command(subcommand)]
        action: RefAction,
    },

    /// Create, delete or push tags
    Tag {
        #[command(subcommand)]
        action: RefAction,
    },

    /// Append patterns to the root .gitignore
    Ignore {
        /// Patterns to add
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Report whether a path is ignored
    CheckIgnore {
        /// Path relative to the repository root
        path: String,

        /// Treat PATH as a directory
        #[arg(long)]
        dir: bool,
    },

    /// Show the commit HEAD points at
    Head {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

/// Ref subcommands shared by `branch` and `tag`.
#[derive(Subcommand, Debug)]
pub enum RefAction {
    /// Create a ref at HEAD or at a commit
    Create {
        /// Name; the current one when empty
        name: String,

        /// Commit to point at instead of HEAD
        #[arg(long, value_name = "HASH")]
        at: Option<String>,

        /// Tag message; makes an annotated tag (tags only)
        #[arg(short, long, default_value = "")]
        message: String,

        /// Push after creating
        #[arg(long)]
        push: bool,
    },

    /// Delete a ref locally and on the remote
    Delete {
        name: String,

        /// Only delete the local ref
        #[arg(long)]
        local: bool,
    },

    /// Push a ref to the remote
    Push {
        /// Name; the current one when omitted
        #[arg(default_value = "")]
        name: String,
    },
}
