//! clone, pull, push and fetch commands

use std::path::Path;

use anyhow::Result;

use crate::cli::Context;
use crate::git::SyncOutcome;
use crate::ui::output;

/// Clone `url` into `dir` (relative to the working directory), or into a
/// new temporary directory whose path is printed.
pub fn clone(ctx: &Context, url: &str, dir: Option<&Path>) -> Result<()> {
    let target = dir.map(|dir| ctx.cwd.join(dir));
    let repo = ctx.client().clone_to_dir(url, target.as_deref())?;
    output::print(repo.root().display(), ctx.verbosity);
    Ok(())
}

pub fn pull(ctx: &Context) -> Result<()> {
    let mut repo = ctx.open()?;
    let outcome = repo.pull()?;
    report(ctx, "pull", outcome);
    Ok(())
}

pub fn push(ctx: &Context) -> Result<()> {
    let repo = ctx.open()?;
    let outcome = repo.push()?;
    report(ctx, "push", outcome);
    Ok(())
}

pub fn fetch(ctx: &Context) -> Result<()> {
    let repo = ctx.open()?;
    let outcome = repo.fetch()?;
    report(ctx, "fetch", outcome);
    Ok(())
}

pub(super) fn report(ctx: &Context, operation: &str, outcome: SyncOutcome) {
    output::print(format!("{}: {}", operation, outcome.label()), ctx.verbosity);
}
