//! `move` subcommand.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::GitRunner,
};
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `move` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct MoveCmd;

impl MoveCmd {
    /// Run the `move` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        let refs = ctx.display_refs()?;

        let selected = inquire::Select::new("Select a diff to check out", refs)
            .with_formatter(&|f| f.value.branch_name.clone())
            .prompt()?;

        let stack = ctx.load_active_stack()?;
        let stack_ref = stack
            .find_by_branch(&selected.branch_name)
            .ok_or_else(|| StError::NotInStack {
                branch: selected.branch_name.clone(),
                title: stack.title.clone(),
            })?;
        ctx.checkout_ref(stack_ref)?;
        println!("Switched to `{}`.", Blue.paint(&selected.branch_name));

        Ok(())
    }
}
