//! `list` subcommand.

use crate::{ctx::StContext, errors::StResult, git::GitRunner};
use clap::Args;

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ListCmd;

impl ListCmd {
    /// Run the `list` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        ctx.print_stack()
    }
}
