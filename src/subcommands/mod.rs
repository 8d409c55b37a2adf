//! The subcommands for the `glst` application.

use crate::{ctx::StContext, errors::StResult, git::GitCli};
use clap::{Args, Subcommand};

mod local;
use local::{AmendCmd, CreateCmd, ListCmd, SaveCmd};

mod navigate;
use navigate::{FirstCmd, LastCmd, MoveCmd, NextCmd, PrevCmd};

mod remote;
use remote::SyncCmd;

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Create, navigate and synchronize stacks of dependent merge requests.
    #[clap(alias = "s")]
    Stack(StackCmd),
}

impl Subcommands {
    /// Run the subcommand with the given context.
    pub async fn run(self, ctx: StContext<GitCli>) -> StResult<()> {
        match self {
            Self::Stack(cmd) => cmd.subcommand.run(ctx).await,
        }
    }
}

/// CLI arguments for the `stack` command group.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct StackCmd {
    /// The stack subcommand to run
    #[clap(subcommand)]
    pub subcommand: StackSubcommands,
}

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum StackSubcommands {
    /// Create a new stack and make it the active stack of the repository.
    #[clap(alias = "new")]
    Create(CreateCmd),
    /// Commit the pending changes as a new diff on top of the active stack.
    Save(SaveCmd),
    /// Amend the checked-out diff with the pending changes.
    Amend(AmendCmd),
    /// Push every diff, open missing merge requests and drop merged ones.
    #[clap(alias = "push")]
    Sync(SyncCmd),
    /// Check out the first diff of the stack.
    First(FirstCmd),
    /// Check out the diff after the checked-out one.
    Next(NextCmd),
    /// Check out the diff before the checked-out one.
    #[clap(alias = "previous")]
    Prev(PrevCmd),
    /// Check out the last diff of the stack.
    Last(LastCmd),
    /// Pick a diff of the stack to check out.
    #[clap(alias = "switch")]
    Move(MoveCmd),
    /// Print the diffs of the active stack.
    #[clap(aliases = ["ls", "log"])]
    List(ListCmd),
}

impl StackSubcommands {
    /// Run the stack subcommand with the given context.
    pub async fn run(self, ctx: StContext<GitCli>) -> StResult<()> {
        match self {
            Self::Create(args) => args.run(ctx),
            Self::Save(args) => args.run(ctx),
            Self::Amend(args) => args.run(ctx),
            Self::Sync(args) => args.run(ctx).await,
            Self::First(args) => args.run(ctx),
            Self::Next(args) => args.run(ctx),
            Self::Prev(args) => args.run(ctx),
            Self::Last(args) => args.run(ctx),
            Self::Move(args) => args.run(ctx),
            Self::List(args) => args.run(ctx),
        }
    }
}
