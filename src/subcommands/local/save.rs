//! `save` subcommand.

use crate::{ctx::StContext, errors::StResult, git::GitRunner};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `save` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SaveCmd {
    /// The files to include. Every pending change is included if omitted.
    pub paths: Vec<String>,
    /// The commit message and merge request title. Prompted for if omitted.
    #[arg(short = 'm', long = "message", visible_alias = "description", short_alias = 'd')]
    pub message: Option<String>,
}

impl SaveCmd {
    /// Run the `save` subcommand.
    pub fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        let description = match self.message {
            Some(message) => message,
            None => inquire::Text::new("Description of the diff:").prompt()?,
        };

        let saved = ctx.save(&self.paths, &description)?;
        println!(
            "Saved diff `{}` on branch `{}`.",
            Color::Green.paint(&saved.description),
            Color::Blue.paint(&saved.branch)
        );

        Ok(())
    }
}
