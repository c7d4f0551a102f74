//! Commands that work on the checked-out tree: checkout, add, commit,
//! write, ignore, check-ignore and head.

use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::git::{CommitInfo, HeadState};
use crate::ui::output;

/// Pathspec that stages every change.
const ALL_PATHS: &str = "*";

pub fn checkout(ctx: &Context, name: &str, tag: bool) -> Result<()> {
    let mut repo = ctx.open()?;
    if tag {
        repo.checkout_tag(name)?;
    } else {
        repo.checkout_branch(name)?;
    }
    if let Some(head) = repo.head().describe() {
        output::print(head, ctx.verbosity);
    }
    Ok(())
}

pub fn add(ctx: &Context, paths: &[String]) -> Result<()> {
    let repo = ctx.open()?;
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
    repo.add(&paths)?;
    Ok(())
}

pub fn commit(ctx: &Context, message: &str, all: bool) -> Result<()> {
    let mut repo = ctx.open()?;
    if all {
        repo.add(&[ALL_PATHS])?;
    }
    match repo.commit(message)? {
        Some(oid) => output::print(oid, ctx.verbosity),
        None => output::print("nothing to commit", ctx.verbosity),
    }
    Ok(())
}

/// Replace `path` with the content of `from`, or of stdin.
pub fn write(ctx: &Context, path: &str, from: Option<&Path>) -> Result<()> {
    let data = match from {
        Some(file) => {
            std::fs::read(file).with_context(|| format!("reading {}", file.display()))?
        }
        None => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .context("reading stdin")?;
            data
        }
    };
    let repo = ctx.open()?;
    repo.rewrite_file(path, &data)?;
    Ok(())
}

pub fn ignore(ctx: &Context, patterns: &[String]) -> Result<()> {
    let repo = ctx.open()?;
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let added = repo.ignore(&patterns)?;
    output::print(format!("{} pattern(s) added", added), ctx.verbosity);
    Ok(())
}

pub fn check_ignore(ctx: &Context, path: &str, dir: bool) -> Result<()> {
    let repo = ctx.open()?;
    let ignored = if dir {
        repo.is_ignored_dir(path)?
    } else {
        repo.is_ignored_file(path)?
    };
    let verdict = if ignored { "ignored" } else { "not ignored" };
    output::print(format!("{}: {}", path, verdict), ctx.verbosity);
    Ok(())
}

#[derive(Serialize)]
struct HeadView<'a> {
    head: &'a HeadState,
    commit: CommitInfo,
}

/// Print HEAD's reference and commit.
pub fn head(ctx: &Context, json: bool) -> Result<()> {
    let repo = ctx.open()?;
    let commit = repo.head_commit()?;

    if json {
        let view = HeadView {
            head: repo.head(),
            commit,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if let Some(head) = repo.head().describe() {
        output::print(head, ctx.verbosity);
    }
    output::print(
        format!(
            "{} {} <{}> {}",
            commit.author_time.format("%Y-%m-%d %H:%M"),
            commit.author_name,
            commit.author_email,
            commit.summary
        ),
        ctx.verbosity,
    );
    Ok(())
}
