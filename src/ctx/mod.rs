//! The in-memory context of the `glst` application.

use crate::{
    config::StConfig,
    constants::CURRENT_STACK_KEY,
    errors::{StError, StResult},
    git::{GitCli, GitExt, GitRunner},
    stack::{Stack, StackRef},
    store::StackStore,
};
use git2::Repository;
use tracing::debug;

mod fmt;
mod mutate;
mod navigate;
mod sync;

pub use navigate::Target;

/// The per-invocation context of the `glst` application: how to run git, where the stacks are
/// stored, and the user's configuration.
pub struct StContext<G> {
    /// The git command runner for the repository.
    pub git: G,
    /// The store holding the repository's stacks.
    pub store: StackStore,
    /// The user's configuration.
    pub cfg: StConfig,
}

impl StContext<GitCli> {
    /// Opens a [StContext] for the given [Repository].
    pub fn open(repository: &Repository, cfg: StConfig) -> StResult<Self> {
        let workdir = repository.workdir().ok_or(StError::NotAGitRepository)?;
        Ok(Self::new(
            GitCli::new(workdir),
            StackStore::new(repository.path()),
            cfg,
        ))
    }
}

impl<G: GitRunner> StContext<G> {
    /// Creates a new [StContext].
    pub fn new(git: G, store: StackStore, cfg: StConfig) -> Self {
        Self { git, store, cfg }
    }

    /// Returns the title of the repository's active stack.
    pub fn active_title(&self) -> StResult<String> {
        self.git
            .local_config(CURRENT_STACK_KEY)?
            .ok_or(StError::NoActiveStack)
    }

    /// Loads the repository's active stack.
    pub fn load_active_stack(&self) -> StResult<Stack> {
        let title = self.active_title()?;
        debug!(%title, "loading active stack");
        self.store.load(&title)
    }

    /// Returns the diff of `stack` whose branch is checked out.
    pub fn current_ref<'s>(&self, stack: &'s Stack) -> StResult<&'s StackRef> {
        let branch = self.git.current_branch_name()?;
        stack
            .find_by_branch(&branch)
            .ok_or_else(|| StError::NotInStack {
                branch,
                title: stack.title.clone(),
            })
    }

    /// Returns the checked-out diff of the active stack.
    pub fn current_entry(&self) -> StResult<StackRef> {
        let stack = self.load_active_stack()?;
        self.current_ref(&stack).cloned()
    }

    /// Removes a diff from `stack` and from disk. The re-linked neighbors are written before the
    /// removed diff's file is deleted.
    pub fn remove_ref(&self, stack: &mut Stack, id: &str) -> StResult<StackRef> {
        let removed = stack.remove_ref(id)?;
        for neighbor in &removed.relinked {
            self.store.update(&stack.title, neighbor)?;
        }
        self.store.remove(&stack.title, &removed.removed)?;
        Ok(removed.removed)
    }
}
