//! Errors for the `glst` application.

use nu_ansi_term::Color;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for all `glst` operations.
#[derive(Error, Debug)]
pub enum StError {
    /// The current working directory is not within a git repository.
    #[error("Not in a git repository.")]
    NotAGitRepository,
    /// No stack has been selected for the repository.
    #[error(
        "No active stack in this repository. Create one with `{}`.",
        Color::Blue.paint("glst stack create")
    )]
    NoActiveStack,
    /// A stack with the given title already exists.
    #[error("Stack `{}` already exists.", Color::Blue.paint(.0))]
    StackAlreadyExists(String),
    /// The stack title is empty, or cannot be used as a directory and branch name component.
    #[error(
        "Invalid stack title `{}`. Titles cannot contain path separators or `..`, and cannot start with `.`.",
        .0
    )]
    InvalidTitle(String),
    /// The stack has no entries.
    #[error(
        "Stack `{}` has no diffs. Save one with `{}`.",
        Color::Blue.paint(.0),
        Color::Blue.paint("glst stack save")
    )]
    EmptyStack(String),
    /// There are no pending changes in the working tree.
    #[error("No changes to save.")]
    NoChanges,
    /// The working tree has uncommitted modifications to tracked files.
    #[error("Working tree is dirty. Commit or stash your changes first.")]
    WorkingTreeDirty,
    /// A diff with the same identifier is already part of the stack.
    #[error(
        "A diff with the same description already exists in stack `{}` (`{}`).",
        Color::Blue.paint(.title),
        .id
    )]
    DuplicateEntry { id: String, title: String },
    /// The checked-out branch is not an entry of the active stack.
    #[error(
        "Branch `{}` is not part of stack `{}`.",
        Color::Blue.paint(.branch),
        Color::Blue.paint(.title)
    )]
    NotInStack { branch: String, title: String },
    /// Attempted to move past the tail of the stack.
    #[error("No next diff.")]
    NoNextDiff,
    /// Attempted to move past the head of the stack.
    #[error("No previous diff.")]
    NoPreviousDiff,
    /// The on-disk stack violates its linked-list invariants.
    #[error("Stack data might have been corrupted: {}", .0)]
    Corrupted(String),
    /// A rebase stopped on conflicts.
    #[error(
        "Could not rebase the stack onto `{}`. Resolve the conflicts manually, then run `{}` again.",
        Color::Blue.paint(.0),
        Color::Blue.paint("glst stack sync")
    )]
    RebaseConflict(String),
    /// A `git` subprocess exited unsuccessfully.
    #[error("`git {command}` failed: {stderr}")]
    GitCommand { command: String, stderr: String },
    /// No GitLab token is configured.
    #[error("No GitLab token found. Set `GITLAB_TOKEN` or `token` in {}.", .0)]
    MissingToken(String),
    /// The GitLab project could not be derived from the remote URL.
    #[error("Could not determine the GitLab project from remote URL `{}`.", .0)]
    UnknownProject(String),
    /// A stored merge request URL does not end with a merge request number.
    #[error("Invalid merge request URL `{}`.", .0)]
    InvalidMergeRequestUrl(String),
    /// A request to the GitLab API could not be completed.
    #[error("Failed to {op}: {source}")]
    Api {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The GitLab API answered with a non-success status.
    #[error("Failed to {op}: GitLab responded with {status}: {message}")]
    ApiStatus {
        op: &'static str,
        status: u16,
        message: String,
    },
    /// Reading or writing a file in the stack store failed.
    #[error("I/O error at {}: {source}", .path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A [std::io::Error] occurred.
    #[error("I/O error: {}", .0)]
    Io(#[from] std::io::Error),
    /// Rendering output failed.
    #[error("Formatting error: {}", .0)]
    Fmt(#[from] std::fmt::Error),
    /// A stack entry could not be (de)serialized.
    #[error("Stack entry serialization error: {}", .0)]
    Json(#[from] serde_json::Error),
    /// The configuration file could not be parsed.
    #[error("Failed to parse config: {}", .0)]
    ConfigParse(#[from] toml::de::Error),
    /// An [inquire::InquireError] occurred.
    #[error("inquire error: {}", .0)]
    Inquire(#[from] inquire::InquireError),
}

/// A [Result] alias where the error is [StError].
pub type StResult<T> = Result<T, StError>;
