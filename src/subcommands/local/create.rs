//! `create` subcommand.

use crate::{ctx::StContext, errors::StResult, git::GitRunner};
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CreateCmd {
    /// The title of the stack. Prompted for if omitted.
    pub title: Vec<String>,
}

impl CreateCmd {
    /// Run the `create` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        let title = if self.title.is_empty() {
            inquire::Text::new("Title of the new stack:").prompt()?
        } else {
            self.title.join(" ")
        };

        let title = ctx.create_stack(&title)?;
        println!(
            "Created stack `{}`. Save changes to add diffs to it.",
            Blue.paint(title)
        );

        Ok(())
    }
}
