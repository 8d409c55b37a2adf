//! Commands that change the shape or content of a stack.

use super::StContext;
use crate::{
    constants::{CURRENT_STACK_KEY, DEFAULT_BRANCH_PREFIX, SHORT_SHA_LEN},
    errors::{StError, StResult},
    git::{GitExt, GitRunner},
    stack::StackRef,
};
use itertools::Itertools;
use std::env;
use tracing::{info, warn};

impl<G: GitRunner> StContext<G> {
    /// Creates a new, empty stack and makes it the active stack of the repository.
    ///
    /// Whitespace in `title` is replaced with dashes.
    pub fn create_stack(&self, title: &str) -> StResult<String> {
        let title = normalize_title(title);
        if !is_valid_title(&title) {
            return Err(StError::InvalidTitle(title));
        }
        if self.store.exists(&title) {
            return Err(StError::StackAlreadyExists(title));
        }

        self.store.create_stack(&title)?;
        self.git.set_local_config(CURRENT_STACK_KEY, &title)?;
        info!(%title, "created stack");

        Ok(title)
    }

    /// Commits the pending changes on a new branch and appends it to the active stack.
    ///
    /// ## Takes
    /// - `paths` - The paths to stage. Every change is staged if empty.
    /// - `description` - The commit message and merge request title.
    ///
    /// ## Returns
    /// - `Ok(stack_ref)` - The new tail of the stack.
    /// - `Err(StError::NoChanges)` - None of `paths` has a pending change.
    /// - `Err(StError::GitCommand)` - The commit failed. The new branch is deleted and the parent
    ///                                branch checked out again.
    pub fn save(&self, paths: &[String], description: &str) -> StResult<StackRef> {
        let mut stack = self.load_active_stack()?;
        if !self.git.has_changes(paths)? {
            return Err(StError::NoChanges);
        }

        self.git.add_files(paths)?;

        let author = self.git.user_name()?;
        let id = self
            .git
            .hash_object(&format!("{description}{}{author}", stack.title))?;
        let branch = branch_name(&self.branch_prefix(), &stack.title, &id);

        // Link in memory first; a duplicate ID must not leave a branch or commit behind.
        let former_tail =
            stack.append(StackRef::new(id.clone(), branch.clone(), description.to_string()))?;

        let parent_branch = self.git.current_branch_name()?;
        self.git.checkout_new_branch(&branch)?;
        if let Err(e) = self.git.commit(description) {
            warn!(%branch, %parent_branch, "commit failed; discarding new branch");
            self.git.checkout_branch(&parent_branch)?;
            self.git.delete_branch(&branch)?;
            return Err(e);
        }

        if let Some(former_tail) = former_tail {
            self.store.update(&stack.title, &former_tail)?;
        }
        let new_ref = stack
            .get(&id)
            .cloned()
            .ok_or_else(|| StError::Corrupted(format!("diff `{id}` vanished after saving")))?;
        self.store.add(&stack.title, &new_ref)?;
        info!(id = %new_ref.id, branch = %new_ref.branch, "saved diff");

        Ok(new_ref)
    }

    /// Amends the checked-out diff's commit with the pending changes.
    ///
    /// ## Takes
    /// - `paths` - The paths to stage. Every change is staged if empty.
    /// - `description` - The new commit message. The existing description is kept if [None].
    ///
    /// ## Returns
    /// - `Ok(stack_ref)` - The amended diff. Its ID and links are unchanged.
    /// - `Err(StError::NotInStack)` - The checked-out branch is not part of the active stack.
    /// - `Err(StError::NoChanges)` - The working tree is clean.
    pub fn amend(&self, paths: &[String], description: Option<&str>) -> StResult<StackRef> {
        let stack = self.load_active_stack()?;
        let mut current = self.current_ref(&stack)?.clone();
        if !self.git.has_changes(paths)? {
            return Err(StError::NoChanges);
        }

        if let Some(description) = description {
            current.description = description.to_string();
        }

        self.git.add_files(paths)?;
        self.git.amend_commit(&current.description)?;
        self.store.update(&stack.title, &current)?;
        info!(id = %current.id, branch = %current.branch, "amended diff");

        Ok(current)
    }

    /// Returns the prefix for new branches: the configured prefix, the OS user name, or a fixed
    /// default, in that order.
    pub fn branch_prefix(&self) -> String {
        self.cfg
            .branch_prefix()
            .map(ToOwned::to_owned)
            .or_else(|| {
                ["USER", "USERNAME"]
                    .into_iter()
                    .filter_map(|var| env::var(var).ok())
                    .find(|user| !user.trim().is_empty())
            })
            .unwrap_or_else(|| DEFAULT_BRANCH_PREFIX.to_string())
    }
}

/// Joins the words of a stack title with dashes.
pub(crate) fn normalize_title(title: &str) -> String {
    title.split_whitespace().join("-")
}

/// Returns `true` if `title` can name both a directory under the stack store and part of a branch.
fn is_valid_title(title: &str) -> bool {
    !title.is_empty()
        && !title.starts_with('.')
        && !title.contains("..")
        && !title.contains(['/', '\\'])
}

/// Returns the branch name for a diff: `<prefix>-<title>-<short id>`.
pub(crate) fn branch_name(prefix: &str, title: &str, id: &str) -> String {
    let short: String = id.chars().take(SHORT_SHA_LEN).collect();
    format!("{prefix}-{title}-{short}")
}
