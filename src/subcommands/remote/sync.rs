//! `sync` subcommand.

use crate::{
    ctx::StContext,
    errors::StResult,
    git::{GitExt, GitRunner},
    gitlab::{project_path_from_remote, GitLabClient},
};
use clap::Args;
use tracing::debug;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SyncCmd;

impl SyncCmd {
    /// Run the `sync` subcommand.
    pub async fn run<G: GitRunner>(self, ctx: StContext<G>) -> StResult<()> {
        // Establish the GitLab API client.
        let remote_url = ctx.git.remote_url(&ctx.cfg.remote)?;
        let project_path = project_path_from_remote(&remote_url)?;
        let host = ctx.cfg.api_host(&remote_url);
        debug!(%host, %project_path, "resolved GitLab project");
        let client = GitLabClient::new(&host, &project_path, ctx.cfg.token()?);

        let report = ctx.sync(&client).await?;
        println!("{}", report.summary());
        ctx.print_stack()
    }
}
