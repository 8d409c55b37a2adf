//! Reconciles the active stack with the remote repository and its merge requests.
//!
//! Each pass walks the stack from head to tail. For every diff it first brings the branch in line
//! with its upstream, then opens a merge request or checks whether the existing one has been
//! merged or closed. A rebase rewrites every downstream commit, so a pass that rebased is
//! followed by another full pass; sync finishes after a pass that rebased nothing.

use super::StContext;
use crate::{
    errors::{StError, StResult},
    git::{BranchStatus, GitExt, GitRunner},
    gitlab::{
        merge_request_iid, MergeRequest, MergeRequestState, NewMergeRequest, ReviewRequests, User,
    },
    stack::{Stack, StackRef},
};
use nu_ansi_term::Color;
use tracing::{debug, info};

/// What a sync did.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct SyncReport {
    /// The number of passes over the stack.
    pub passes: usize,
    /// Branches the stack was rebased onto.
    pub rebased_onto: Vec<String>,
    /// Branches that were fast-forwarded to their upstream.
    pub pulled: Vec<String>,
    /// Merge requests opened during the sync.
    pub created: Vec<MergeRequest>,
    /// Open merge requests that were found for unsynced diffs and recorded.
    pub adopted: Vec<MergeRequest>,
    /// Diffs removed from the stack, with the state of their merge request.
    pub removed: Vec<(StackRef, MergeRequestState)>,
}

impl SyncReport {
    /// Renders a one-line, colored summary of the sync for the terminal.
    pub fn summary(&self) -> String {
        format!(
            "Synced stack in {} pass(es): {} created, {} adopted, {} removed, {} pulled, {} rebased.",
            self.passes,
            Color::Green.paint(self.created.len().to_string()),
            Color::Blue.paint(self.adopted.len().to_string()),
            Color::Purple.paint(self.removed.len().to_string()),
            Color::Cyan.paint(self.pulled.len().to_string()),
            Color::Yellow.paint(self.rebased_onto.len().to_string()),
        )
    }
}

/// Remote values fetched at most once per sync.
#[derive(Default)]
struct RemoteCache {
    user: Option<User>,
    default_branch: Option<String>,
}

impl RemoteCache {
    async fn user<R: ReviewRequests>(&mut self, reviews: &R) -> StResult<&User> {
        let user = match self.user.take() {
            Some(user) => user,
            None => reviews.current_user().await?,
        };
        Ok(self.user.insert(user))
    }

    async fn default_branch<R: ReviewRequests>(&mut self, reviews: &R) -> StResult<String> {
        let branch = match self.default_branch.take() {
            Some(branch) => branch,
            None => reviews.default_branch().await?,
        };
        Ok(self.default_branch.insert(branch).clone())
    }
}

impl<G: GitRunner> StContext<G> {
    /// Synchronizes the active stack with the remote and its merge requests.
    ///
    /// ## Returns
    /// - `Ok(report)` - Every pass completed.
    /// - `Err(StError::RebaseConflict)` - A rebase stopped on conflicts and was left in progress.
    /// - `Err(_)` - A git or API call failed. Diffs processed before the failure keep their
    ///              persisted state.
    pub async fn sync<R: ReviewRequests>(&self, reviews: &R) -> StResult<SyncReport> {
        let title = self.active_title()?;
        if self.git.has_tracked_changes()? {
            return Err(StError::WorkingTreeDirty);
        }

        let starting_branch = self.git.current_branch_name()?;
        let started_on_diff = self
            .store
            .load(&title)?
            .find_by_branch(&starting_branch)
            .is_some();

        let mut report = SyncReport::default();
        let mut cache = RemoteCache::default();

        loop {
            report.passes += 1;
            let mut needs_another_pass = false;
            info!(%title, pass = report.passes, "syncing stack");

            self.git.fetch(&self.cfg.remote)?;
            let mut stack = self.store.load(&title)?;
            if stack.is_empty() {
                if report.passes == 1 {
                    return Err(StError::EmptyStack(title));
                }
                break;
            }

            let mut cursor = Some(stack.first()?.id.clone());
            while let Some(id) = cursor {
                let stack_ref = stack.get(&id).cloned().ok_or_else(|| {
                    StError::Corrupted(format!("diff `{id}` vanished during sync"))
                })?;

                if self.sync_branch(&stack, &stack_ref, &mut report)? {
                    needs_another_pass = true;
                }
                self.sync_merge_request(&mut stack, &stack_ref, reviews, &mut cache, &mut report)
                    .await?;

                cursor = (!stack_ref.next.is_empty()).then(|| stack_ref.next.clone());
            }

            if !needs_another_pass {
                break;
            }
            debug!("stack was rebased; walking it again");
        }

        self.restore_checkout(&title, &starting_branch, started_on_diff)?;
        Ok(report)
    }

    /// Brings a diff's branch in line with its upstream.
    ///
    /// Returns `true` if the stack was rebased, which invalidates every downstream commit.
    fn sync_branch(
        &self,
        stack: &Stack,
        stack_ref: &StackRef,
        report: &mut SyncReport,
    ) -> StResult<bool> {
        self.git.checkout_branch(&stack_ref.branch)?;

        match self.git.branch_status()? {
            BranchStatus::Behind => {
                info!(branch = %stack_ref.branch, "fast-forwarding to upstream");
                self.git.pull()?;
                report.pulled.push(stack_ref.branch.clone());
                Ok(false)
            }
            BranchStatus::Diverged => {
                info!(branch = %stack_ref.branch, "branch diverged from upstream; rebasing stack");
                let last = stack.last()?;
                self.git.checkout_branch(&last.branch)?;
                self.git.rebase_update_refs(&stack_ref.branch)?;

                for stack_ref in stack.ordered()? {
                    self.git.force_push(&self.cfg.remote, &stack_ref.branch)?;
                }

                println!(
                    "Rebased stack onto `{}` and force-pushed {} branches.",
                    Color::Blue.paint(&stack_ref.branch),
                    stack.len()
                );
                report.rebased_onto.push(stack_ref.branch.clone());
                Ok(true)
            }
            status => {
                debug!(branch = %stack_ref.branch, ?status, "branch needs no update");
                Ok(false)
            }
        }
    }

    /// Opens a merge request for an unsynced diff, or removes the diff from the stack if its merge
    /// request has been merged or closed.
    async fn sync_merge_request<R: ReviewRequests>(
        &self,
        stack: &mut Stack,
        stack_ref: &StackRef,
        reviews: &R,
        cache: &mut RemoteCache,
        report: &mut SyncReport,
    ) -> StResult<()> {
        if !stack_ref.has_merge_request() {
            self.git.push_upstream(&self.cfg.remote, &stack_ref.branch)?;

            let target_branch = match stack.prev_of(stack_ref)? {
                Some(prev) => prev.branch.clone(),
                None => cache.default_branch(reviews).await?,
            };

            let merge_request = match reviews.find_open(&stack_ref.branch).await? {
                Some(existing) => {
                    info!(
                        branch = %stack_ref.branch,
                        iid = existing.iid,
                        "found open merge request"
                    );
                    report.adopted.push(existing.clone());
                    existing
                }
                None => {
                    let assignee_id = cache.user(reviews).await?.id;
                    let created = reviews
                        .create(&NewMergeRequest {
                            source_branch: &stack_ref.branch,
                            target_branch: &target_branch,
                            title: &stack_ref.description,
                            assignee_id,
                            remove_source_branch: true,
                        })
                        .await?;
                    info!(branch = %stack_ref.branch, iid = created.iid, "created merge request");
                    report.created.push(created.clone());
                    created
                }
            };

            let updated = stack
                .get_mut(&stack_ref.id)
                .map(|r| {
                    r.mr_url = merge_request.web_url.clone();
                    r.clone()
                })
                .ok_or_else(|| {
                    StError::Corrupted(format!("diff `{}` vanished during sync", stack_ref.id))
                })?;
            self.store.update(&stack.title, &updated)?;

            println!("{}", merge_request.summary());
            return Ok(());
        }

        let merge_request = reviews.get(merge_request_iid(&stack_ref.mr_url)?).await?;
        if merge_request.state.is_finished() {
            let removed = self.remove_ref(stack, &stack_ref.id)?;
            println!(
                "Merge request for `{}` was {}; removed it from the stack.",
                Color::Blue.paint(&removed.branch),
                Color::Purple.bold().paint(merge_request.state.to_string())
            );
            report.removed.push((removed, merge_request.state));
        } else {
            debug!(
                branch = %stack_ref.branch,
                state = %merge_request.state,
                "merge request is current"
            );
        }

        Ok(())
    }

    /// Returns to the branch sync started on, falling back to the tail of the stack if that branch
    /// was a diff that has since been removed.
    fn restore_checkout(
        &self,
        title: &str,
        starting_branch: &str,
        started_on_diff: bool,
    ) -> StResult<()> {
        let stack = self.store.load(title)?;
        if !started_on_diff || stack.find_by_branch(starting_branch).is_some() {
            return self.git.checkout_branch(starting_branch);
        }
        if !stack.is_empty() {
            return self.git.checkout_branch(&stack.last()?.branch);
        }
        Ok(())
    }
}
