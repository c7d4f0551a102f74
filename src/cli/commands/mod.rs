//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler opens what it needs through the [`Context`], calls one or
//! two repository operations and prints a short result. The operations log
//! their own `[git]` line.

mod refs;
mod sync;
mod worktree;

pub use refs::{branch, tag};
pub use sync::{clone, fetch, pull, push};
pub use worktree::{add, check_ignore, checkout, commit, head, ignore, write};

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Clone { url, dir } => sync::clone(ctx, &url, dir.as_deref()),
        Command::Pull => sync::pull(ctx),
        Command::Push => sync::push(ctx),
        Command::Fetch => sync::fetch(ctx),

        Command::Checkout { name, tag } => worktree::checkout(ctx, &name, tag),
        Command::Add { paths } => worktree::add(ctx, &paths),
        Command::Commit { message, all } => worktree::commit(ctx, &message, all),
        Command::Write { path, from } => worktree::write(ctx, &path, from.as_deref()),
        Command::Ignore { patterns } => worktree::ignore(ctx, &patterns),
        Command::CheckIgnore { path, dir } => worktree::check_ignore(ctx, &path, dir),
        Command::Head { json } => worktree::head(ctx, json),

        Command::Branch { action } => refs::branch(ctx, action),
        Command::Tag { action } => refs::tag(ctx, action),
    }
}
