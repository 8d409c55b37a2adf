//! `first`, `last`, `next` and `prev` subcommands.

use crate::{
    ctx::{StContext, Target},
    errors::StResult,
    git::GitRunner,
};
use clap::Args;
use nu_ansi_term::Color::Blue;

/// Checks out `target` and reports the branch that is now checked out.
fn traverse<G: GitRunner>(ctx: StContext<G>, target: Target) -> StResult<()> {
    let stack_ref = ctx.navigate(target)?;
    println!(
        "Switched to `{}`: {}",
        Blue.paint(&stack_ref.branch),
        stack_ref.description
    );
    Ok(())
}

/// CLI arguments for the `first` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct FirstCmd;

impl FirstCmd {
    /// Run the `first` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        traverse(ctx, Target::First)
    }
}

/// CLI arguments for the `last` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct LastCmd;

impl LastCmd {
    /// Run the `last` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        traverse(ctx, Target::Last)
    }
}

/// CLI arguments for the `next` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct NextCmd;

impl NextCmd {
    /// Run the `next` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        traverse(ctx, Target::Next)
    }
}

/// CLI arguments for the `prev` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct PrevCmd;

impl PrevCmd {
    /// Run the `prev` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        traverse(ctx, Target::Prev)
    }
}
