//! Subcommands for moving between the diffs of a stack.

mod traverse;
pub use traverse::{FirstCmd, LastCmd, NextCmd, PrevCmd};

mod select;
pub use select::MoveCmd;
