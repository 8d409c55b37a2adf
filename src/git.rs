//! Utilities for interacting with `git` repositories for the `glst` application.
//!
//! Every mutation of the working tree goes through the `git` binary. [GitRunner] is the narrow
//! capability the rest of the application depends on, and [GitExt] layers the typed operations
//! used by the stack commands on top of it.

use crate::errors::{StError, StResult};
use git2::Repository;
use itertools::Itertools;
use std::{
    env,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
use tracing::{debug, trace};

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}

/// Runs `git` subcommands and returns their standard output.
pub trait GitRunner {
    /// Runs `git <args>`, optionally feeding `input` to the process' standard input.
    ///
    /// ## Takes
    /// - `args` - The arguments to pass to `git`.
    /// - `input` - Data to write to standard input, if any.
    ///
    /// ## Returns
    /// - `Ok(stdout)` - The raw standard output of the command.
    /// - `Err(StError::GitCommand)` - If the command exited unsuccessfully.
    fn git_with_input(&self, args: &[&str], input: Option<&str>) -> StResult<String>;

    /// Runs `git <args>` and returns its standard output.
    fn git(&self, args: &[&str]) -> StResult<String> {
        self.git_with_input(args, None)
    }
}

/// A [GitRunner] that shells out to the `git` binary within a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Creates a new [GitCli] that runs commands within `workdir`.
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }
}

impl GitRunner for GitCli {
    fn git_with_input(&self, args: &[&str], input: Option<&str>) -> StResult<String> {
        let command = args.iter().join(" ");
        debug!(%command, "running git");

        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            // Status parsing depends on the untranslated messages.
            .env("LC_ALL", "C")
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(input.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!(%command, %stdout, "git finished");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(StError::GitCommand {
                command,
                stderr: if stderr.is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(stdout)
    }
}

/// The state of the checked-out branch relative to its upstream, as reported by `git status`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BranchStatus {
    /// The branch matches its upstream.
    UpToDate,
    /// The branch has local commits that are not on the upstream.
    Ahead,
    /// The upstream has commits that are not on the branch, and the branch can be fast-forwarded.
    Behind,
    /// Both the branch and its upstream have commits the other lacks.
    Diverged,
    /// The branch has no upstream, or the status could not be determined.
    NoUpstream,
}

impl BranchStatus {
    /// Parses the long-form output of `git status`.
    pub fn parse(status: &str) -> Self {
        if status.contains("have diverged") {
            Self::Diverged
        } else if status.contains("Your branch is behind") {
            Self::Behind
        } else if status.contains("Your branch is ahead") {
            Self::Ahead
        } else if status.contains("Your branch is up to date") {
            Self::UpToDate
        } else {
            Self::NoUpstream
        }
    }
}

/// Extension trait for [GitRunner]s exposing the git operations used by the stack commands.
pub trait GitExt: GitRunner {
    /// Returns the name of the checked-out branch.
    fn current_branch_name(&self) -> StResult<String> {
        Ok(self
            .git(&["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }

    /// Checks out an existing branch.
    fn checkout_branch(&self, branch_name: &str) -> StResult<()> {
        self.git(&["checkout", branch_name]).map(drop)
    }

    /// Creates a branch at `HEAD` and checks it out.
    fn checkout_new_branch(&self, branch_name: &str) -> StResult<()> {
        self.git(&["checkout", "-b", branch_name]).map(drop)
    }

    /// Force-deletes a local branch.
    fn delete_branch(&self, branch_name: &str) -> StResult<()> {
        self.git(&["branch", "-D", branch_name]).map(drop)
    }

    /// Returns `true` if any of `paths` has a pending change, including untracked files. Every
    /// path in the working tree is considered if `paths` is empty.
    fn has_changes(&self, paths: &[String]) -> StResult<bool> {
        let mut args = vec!["status", "--porcelain"];
        if !paths.is_empty() {
            args.push("--");
            args.extend(paths.iter().map(String::as_str));
        }
        Ok(!self.git(&args)?.trim().is_empty())
    }

    /// Returns `true` if any tracked file has been modified or staged.
    fn has_tracked_changes(&self) -> StResult<bool> {
        Ok(!self
            .git(&["status", "--porcelain", "--untracked-files=no"])?
            .trim()
            .is_empty())
    }

    /// Stages the given paths, or every change in the working tree if `paths` is empty.
    fn add_files(&self, paths: &[String]) -> StResult<()> {
        if paths.is_empty() {
            return self.git(&["add", "-A"]).map(drop);
        }

        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.git(&args).map(drop)
    }

    /// Commits the staged changes with the given message.
    fn commit(&self, message: &str) -> StResult<()> {
        self.git(&["commit", "-m", message]).map(drop)
    }

    /// Amends the `HEAD` commit with the staged changes and the given message.
    fn amend_commit(&self, message: &str) -> StResult<()> {
        self.git(&["commit", "--amend", "-m", message]).map(drop)
    }

    /// Returns the configured `user.name`.
    fn user_name(&self) -> StResult<String> {
        Ok(self.git(&["config", "user.name"])?.trim().to_string())
    }

    /// Hashes `input` as a git blob and returns the object ID.
    fn hash_object(&self, input: &str) -> StResult<String> {
        Ok(self
            .git_with_input(&["hash-object", "--stdin"], Some(input))?
            .trim()
            .to_string())
    }

    /// Reads a repository-local config value, returning [None] if the key is unset.
    fn local_config(&self, key: &str) -> StResult<Option<String>> {
        match self.git(&["config", "--local", "--get", key]) {
            Ok(value) => Ok(Some(value.trim().to_string()).filter(|v| !v.is_empty())),
            // `git config --get` exits non-zero without output when the key is missing.
            Err(StError::GitCommand { stderr, .. }) if stderr.is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sets a repository-local config value.
    fn set_local_config(&self, key: &str, value: &str) -> StResult<()> {
        self.git(&["config", "--local", key, value]).map(drop)
    }

    /// Returns the URL of the given remote.
    fn remote_url(&self, remote: &str) -> StResult<String> {
        Ok(self
            .git(&["remote", "get-url", remote])?
            .trim()
            .to_string())
    }

    /// Fetches from the given remote.
    fn fetch(&self, remote: &str) -> StResult<()> {
        self.git(&["fetch", remote]).map(drop)
    }

    /// Returns the [BranchStatus] of the checked-out branch relative to its upstream.
    fn branch_status(&self) -> StResult<BranchStatus> {
        Ok(BranchStatus::parse(&self.git(&["status", "-uno"])?))
    }

    /// Fast-forwards the checked-out branch to its upstream.
    fn pull(&self) -> StResult<()> {
        self.git(&["pull", "--ff-only"]).map(drop)
    }

    /// Pushes a branch and sets its upstream.
    fn push_upstream(&self, remote: &str, branch_name: &str) -> StResult<()> {
        self.git(&["push", "--set-upstream", remote, branch_name])
            .map(drop)
    }

    /// Force-pushes a branch, refusing to overwrite remote work that has not been fetched.
    fn force_push(&self, remote: &str, branch_name: &str) -> StResult<()> {
        self.git(&["push", "--force-with-lease", remote, branch_name])
            .map(drop)
    }

    /// Rebases the checked-out branch onto `onto`, moving every branch pointer between them.
    ///
    /// ## Returns
    /// - `Ok(())` - The rebase completed.
    /// - `Err(StError::RebaseConflict)` - The rebase stopped on conflicts. It is left in progress
    ///                                    for the user to resolve.
    /// - `Err(StError::GitCommand)` - The rebase could not start.
    fn rebase_update_refs(&self, onto: &str) -> StResult<()> {
        self.git(&["rebase", "--fork-point", "--update-refs", onto])
            .map(drop)
            .map_err(|e| match e {
                StError::GitCommand { ref stderr, .. } if is_rebase_conflict(stderr) => {
                    StError::RebaseConflict(onto.to_string())
                }
                e => e,
            })
    }
}

impl<T: GitRunner + ?Sized> GitExt for T {}

/// Returns `true` if the output of a failed rebase shows it stopped on a conflicting commit.
fn is_rebase_conflict(output: &str) -> bool {
    output.contains("CONFLICT") || output.contains("could not apply")
}
