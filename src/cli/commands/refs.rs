//! branch and tag commands

use anyhow::Result;

use super::sync::report;
use crate::cli::args::RefAction;
use crate::cli::Context;
use crate::git::RemoteRef;

pub fn branch(ctx: &Context, action: RefAction) -> Result<()> {
    let repo = ctx.open()?;
    match action {
        RefAction::Create {
            name,
            at,
            message: _,
            push,
        } => {
            let handle = repo.create_branch(&name, at.as_deref())?;
            if push {
                report(ctx, "push", handle.push()?);
            }
        }
        RefAction::Delete { name, local: true } => repo.delete_local_branch(&name)?,
        RefAction::Delete { name, local: false } => {
            report(ctx, "delete", repo.delete_branch(&name)?);
        }
        RefAction::Push { name } => {
            let handle = repo.branch(&name)?;
            report(ctx, "push", handle.push()?);
        }
    }
    Ok(())
}

pub fn tag(ctx: &Context, action: RefAction) -> Result<()> {
    let repo = ctx.open()?;
    match action {
        RefAction::Create {
            name,
            at,
            message,
            push,
        } => {
            let handle = repo.create_tag(&name, &message, at.as_deref())?;
            if push {
                report(ctx, "push", handle.push()?);
            }
        }
        RefAction::Delete { name, local: true } => repo.delete_local_tag(&name)?,
        RefAction::Delete { name, local: false } => {
            report(ctx, "delete", repo.delete_tag(&name)?);
        }
        RefAction::Push { name } => {
            let handle = repo.tag(&name)?;
            report(ctx, "push", handle.push()?);
        }
    }
    Ok(())
}
