//! Contains the formatting logic for the [StContext] struct.

use super::StContext;
use crate::{
    errors::StResult,
    git::{GitExt, GitRunner},
    stack::DisplayRef,
};
use std::fmt::Write;

impl<G: GitRunner> StContext<G> {
    /// Gathers an in-order list of [DisplayRef]s for the active stack, highlighting the checked-out
    /// diff.
    ///
    /// This function is particularly useful when creating prompts with [inquire::Select].
    pub fn display_refs(&self) -> StResult<Vec<DisplayRef>> {
        let stack = self.load_active_stack()?;
        let checked_out = self.git.current_branch_name()?;
        stack.display_refs(Some(checked_out.as_str()))
    }

    /// Writes the active stack to the given [Write]r.
    pub fn write_stack<W: Write>(&self, w: &mut W) -> StResult<()> {
        let stack = self.load_active_stack()?;
        let checked_out = self.git.current_branch_name()?;
        stack.write_stack(w, Some(checked_out.as_str()))
    }

    /// Prints the active stack.
    pub fn print_stack(&self) -> StResult<()> {
        let mut buf = String::new();
        self.write_stack(&mut buf)?;
        print!("{}", buf);
        Ok(())
    }
}
