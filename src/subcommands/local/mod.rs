//! Subcommands that only touch the local repository.

mod create;
pub use create::CreateCmd;

mod save;
pub use save::SaveCmd;

mod amend;
pub use amend::AmendCmd;

mod list;
pub use list::ListCmd;
