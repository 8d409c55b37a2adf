//! `amend` subcommand.

use crate::{ctx::StContext, errors::StResult, git::GitRunner};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `amend` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct AmendCmd {
    /// The files to include. Every pending change is included if omitted.
    pub paths: Vec<String>,
    /// The new description of the diff. Prompted for, pre-filled with the current one, if omitted.
    #[arg(short = 'm', long = "message", visible_alias = "description", short_alias = 'd')]
    pub message: Option<String>,
}

impl AmendCmd {
    /// Run the `amend` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        let description = match self.message {
            Some(message) => message,
            None => {
                let current = ctx.current_entry()?;
                inquire::Text::new("Description of the diff:")
                    .with_initial_value(&current.description)
                    .prompt()?
            }
        };

        let amended = ctx.amend(&self.paths, Some(&description))?;
        println!(
            "Amended diff `{}` on branch `{}`.",
            Color::Green.paint(&amended.description),
            Color::Blue.paint(&amended.branch)
        );

        Ok(())
    }
}
