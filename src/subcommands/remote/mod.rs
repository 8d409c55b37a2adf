//! Subcommands that talk to the remote repository and GitLab.

mod sync;
pub use sync::SyncCmd;
