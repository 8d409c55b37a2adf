//! Moving between the diffs of a stack.

use super::StContext;
use crate::{
    errors::{StError, StResult},
    git::{GitExt, GitRunner},
    stack::StackRef,
};
use tracing::info;

/// The diff to check out, relative to the stack or to the checked-out diff.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Target {
    /// The head of the stack.
    First,
    /// The tail of the stack.
    Last,
    /// The diff after the checked-out diff.
    Next,
    /// The diff before the checked-out diff.
    Prev,
}

impl<G: GitRunner> StContext<G> {
    /// Resolves `target` within the active stack and checks out its branch.
    ///
    /// ## Returns
    /// - `Ok(stack_ref)` - The diff that is now checked out.
    /// - `Err(StError::NoNextDiff | StError::NoPreviousDiff)` - The checked-out diff is already
    ///                                                          at that end of the stack.
    pub fn navigate(&self, target: Target) -> StResult<StackRef> {
        let stack = self.load_active_stack()?;
        let destination = match target {
            Target::First => stack.first()?,
            Target::Last => stack.last()?,
            Target::Next => {
                let current = self.current_ref(&stack)?;
                stack.next_of(current)?.ok_or(StError::NoNextDiff)?
            }
            Target::Prev => {
                let current = self.current_ref(&stack)?;
                stack.prev_of(current)?.ok_or(StError::NoPreviousDiff)?
            }
        }
        .clone();

        self.checkout_ref(&destination)?;
        Ok(destination)
    }

    /// Checks out the branch of the given diff.
    pub fn checkout_ref(&self, stack_ref: &StackRef) -> StResult<()> {
        info!(branch = %stack_ref.branch, "checking out diff");
        self.git.checkout_branch(&stack_ref.branch)
    }
}
