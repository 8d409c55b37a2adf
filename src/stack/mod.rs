//! Structured, [Serialize] + [Deserialize] representation of a stack of diffs.
//!
//! A [Stack] is a doubly-linked list of [StackRef]s stored as a flat arena keyed by ID. The links
//! are only trusted after [Stack::from_refs] has validated them: a non-empty stack has exactly one
//! head, exactly one tail, and walking `next` from the head visits every entry once.

use crate::errors::{StError, StResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

mod fmt;
pub(crate) use fmt::DisplayRef;

/// A single diff within a stack: one commit on its own branch, with an optional merge request.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackRef {
    /// The ID of the previous diff. Empty if this is the head of the stack.
    pub prev: String,
    /// The branch holding the diff's commit.
    pub branch: String,
    /// The identifier of the diff, derived from its description, the stack title, and the author.
    #[serde(rename = "sha")]
    pub id: String,
    /// The ID of the next diff. Empty if this is the tail of the stack.
    pub next: String,
    /// The web URL of the diff's merge request. Empty until the diff has been synced.
    #[serde(rename = "mr")]
    pub mr_url: String,
    /// The commit message and merge request title.
    pub description: String,
}

impl StackRef {
    /// Creates a new, unlinked [StackRef].
    pub fn new(id: String, branch: String, description: String) -> Self {
        Self {
            id,
            branch,
            description,
            ..Default::default()
        }
    }

    /// Returns `true` if the diff is the head of its stack.
    pub fn is_first(&self) -> bool {
        self.prev.is_empty()
    }

    /// Returns `true` if the diff is the tail of its stack.
    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }

    /// Returns `true` if a merge request has been opened for the diff.
    pub fn has_merge_request(&self) -> bool {
        !self.mr_url.is_empty()
    }
}

/// A [StackRef] removed from a [Stack], along with the neighbors whose links changed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RemovedRef {
    /// The removed diff.
    pub removed: StackRef,
    /// The re-linked neighbors, in stack order.
    pub relinked: Vec<StackRef>,
}

/// An ordered chain of diffs.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Stack {
    /// The title of the stack.
    pub title: String,
    /// All diffs in the stack, keyed by ID.
    refs: HashMap<String, StackRef>,
}

impl Stack {
    /// Creates an empty [Stack].
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            refs: HashMap::default(),
        }
    }

    /// Assembles a [Stack] from an unordered set of diffs and validates its links.
    ///
    /// ## Returns
    /// - `Ok(stack)` - The diffs form a single, well-linked chain.
    /// - `Err(StError::Corrupted)` - IDs are duplicated, or the links do not form a chain.
    pub fn from_refs(
        title: impl Into<String>,
        refs: impl IntoIterator<Item = StackRef>,
    ) -> StResult<Self> {
        let mut stack = Self::new(title);
        for stack_ref in refs {
            if let Some(dup) = stack.refs.insert(stack_ref.id.clone(), stack_ref) {
                return Err(corrupted(format!("diff `{}` is stored more than once", dup.id)));
            }
        }

        stack.ordered()?;
        Ok(stack)
    }

    /// Returns `true` if the stack has no diffs.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Returns the number of diffs in the stack.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Gets a diff by ID.
    pub fn get(&self, id: &str) -> Option<&StackRef> {
        self.refs.get(id)
    }

    /// Gets a mutable diff by ID.
    ///
    /// The links of the returned diff must not be modified; use [Stack::append] and
    /// [Stack::remove_ref] instead.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut StackRef> {
        self.refs.get_mut(id)
    }

    /// Finds the diff whose branch is `branch_name`.
    pub fn find_by_branch(&self, branch_name: &str) -> Option<&StackRef> {
        self.refs.values().find(|r| r.branch == branch_name)
    }

    /// Returns the head of the stack.
    ///
    /// ## Returns
    /// - `Ok(head)` - The unique diff without a previous diff.
    /// - `Err(StError::EmptyStack)` - The stack has no diffs.
    /// - `Err(StError::Corrupted)` - There is no unique head.
    pub fn first(&self) -> StResult<&StackRef> {
        self.unique(StackRef::is_first, "previous")
    }

    /// Returns the tail of the stack.
    ///
    /// ## Returns
    /// - `Ok(tail)` - The unique diff without a next diff.
    /// - `Err(StError::EmptyStack)` - The stack has no diffs.
    /// - `Err(StError::Corrupted)` - There is no unique tail.
    pub fn last(&self) -> StResult<&StackRef> {
        self.unique(StackRef::is_last, "next")
    }

    fn unique(&self, predicate: fn(&StackRef) -> bool, neighbor: &str) -> StResult<&StackRef> {
        if self.is_empty() {
            return Err(StError::EmptyStack(self.title.clone()));
        }

        let mut candidates = self.refs.values().filter(|r| predicate(r));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Ok(only),
            (None, _) => Err(corrupted(format!("no diff is missing a {neighbor} diff"))),
            (Some(_), Some(_)) => Err(corrupted(format!(
                "{} diffs are missing a {neighbor} diff",
                2 + candidates.count()
            ))),
        }
    }

    /// Returns the diff after `stack_ref`, or [None] if `stack_ref` is the tail.
    pub fn next_of(&self, stack_ref: &StackRef) -> StResult<Option<&StackRef>> {
        self.neighbor(&stack_ref.next)
    }

    /// Returns the diff before `stack_ref`, or [None] if `stack_ref` is the head.
    pub fn prev_of(&self, stack_ref: &StackRef) -> StResult<Option<&StackRef>> {
        self.neighbor(&stack_ref.prev)
    }

    fn neighbor(&self, id: &str) -> StResult<Option<&StackRef>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.refs
            .get(id)
            .map(Some)
            .ok_or_else(|| corrupted(format!("diff `{id}` is linked but does not exist")))
    }

    /// Returns the diffs from head to tail.
    ///
    /// ## Returns
    /// - `Ok(diffs)` - Every diff, in stack order. Empty if the stack is empty.
    /// - `Err(StError::Corrupted)` - The links are dangling, inconsistent, cyclic, or leave diffs
    ///                               unreachable from the head.
    pub fn ordered(&self) -> StResult<Vec<&StackRef>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let mut current = self.first()?;
        let last = self.last()?;
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(self.refs.len());

        loop {
            if !seen.insert(current.id.as_str()) {
                return Err(corrupted(format!("diff `{}` is linked in a cycle", current.id)));
            }
            ordered.push(current);

            let Some(next) = self.next_of(current)? else {
                break;
            };
            if next.prev != current.id {
                return Err(corrupted(format!(
                    "diff `{}` follows `{}` but points back to `{}`",
                    next.id, current.id, next.prev
                )));
            }
            current = next;
        }

        if current.id != last.id || ordered.len() != self.refs.len() {
            return Err(corrupted(format!(
                "{} of {} diffs are reachable from the head of the stack",
                ordered.len(),
                self.refs.len()
            )));
        }

        Ok(ordered)
    }

    /// Links `stack_ref` after the current tail and adds it to the stack.
    ///
    /// ## Returns
    /// - `Ok(Some(tail))` - The former tail, updated to point at the new diff.
    /// - `Ok(None)` - The stack was empty; the new diff is both head and tail.
    /// - `Err(StError::DuplicateEntry)` - A diff with the same ID is already in the stack.
    pub fn append(&mut self, mut stack_ref: StackRef) -> StResult<Option<StackRef>> {
        if self.refs.contains_key(&stack_ref.id) {
            return Err(StError::DuplicateEntry {
                id: stack_ref.id,
                title: self.title.clone(),
            });
        }

        let former_tail = if self.is_empty() {
            None
        } else {
            Some(self.last()?.id.clone())
        };

        stack_ref.prev = former_tail.clone().unwrap_or_default();
        stack_ref.next = String::new();

        let updated_tail = former_tail.and_then(|id| {
            let tail = self.refs.get_mut(&id)?;
            tail.next = stack_ref.id.clone();
            Some(tail.clone())
        });

        self.refs.insert(stack_ref.id.clone(), stack_ref);
        Ok(updated_tail)
    }

    /// Removes a diff from the stack, linking its neighbors to each other.
    ///
    /// If the removed diff was the head or the tail, its neighbor becomes the new head or tail.
    /// Removing the only diff leaves the stack empty.
    pub fn remove_ref(&mut self, id: &str) -> StResult<RemovedRef> {
        let target = self
            .refs
            .get(id)
            .ok_or_else(|| corrupted(format!("diff `{id}` is not part of the stack")))?;
        let (prev_id, next_id) = (target.prev.clone(), target.next.clone());

        // Resolve both neighbors before mutating anything.
        self.neighbor(&prev_id)?;
        self.neighbor(&next_id)?;

        let mut relinked = Vec::with_capacity(2);
        if let Some(prev) = self.refs.get_mut(&prev_id) {
            prev.next = next_id.clone();
            relinked.push(prev.clone());
        }
        if let Some(next) = self.refs.get_mut(&next_id) {
            next.prev = prev_id;
            relinked.push(next.clone());
        }

        let removed = self
            .refs
            .remove(id)
            .ok_or_else(|| corrupted(format!("diff `{id}` is not part of the stack")))?;
        Ok(RemovedRef { removed, relinked })
    }
}

fn corrupted(reason: String) -> StError {
    warn!(%reason, "stack failed validation");
    StError::Corrupted(reason)
}
