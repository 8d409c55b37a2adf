//! In-memory fakes of the external collaborators, for tests.

use crate::{
    errors::{StError, StResult},
    git::GitRunner,
    gitlab::{MergeRequest, MergeRequestState, NewMergeRequest, ReviewRequests, User},
};
use async_trait::async_trait;
use std::{
    cell::RefCell,
    collections::{hash_map::DefaultHasher, HashMap},
    hash::{Hash, Hasher},
    sync::Mutex,
};

/// A scripted [GitRunner] that records every command it receives.
///
/// Unscripted commands succeed with empty output, except for the handful that carry state:
/// checkouts move `HEAD`, `rev-parse --abbrev-ref HEAD` reports it, local config is kept in a
/// map, and `hash-object --stdin` hashes its input deterministically.
pub(crate) struct FakeGit {
    head: RefCell<String>,
    calls: RefCell<Vec<String>>,
    scripted: RefCell<Vec<(String, Result<String, String>)>>,
    config: RefCell<HashMap<String, String>>,
}

impl FakeGit {
    pub(crate) fn new(head: &str) -> Self {
        Self {
            head: RefCell::new(head.to_string()),
            calls: RefCell::default(),
            scripted: RefCell::default(),
            config: RefCell::default(),
        }
    }

    /// Answers the next command starting with `prefix` with `output`.
    pub(crate) fn respond(&self, prefix: &str, output: &str) -> &Self {
        self.scripted
            .borrow_mut()
            .push((prefix.to_string(), Ok(output.to_string())));
        self
    }

    /// Fails the next command starting with `prefix` with `stderr`.
    pub(crate) fn fail(&self, prefix: &str, stderr: &str) -> &Self {
        self.scripted
            .borrow_mut()
            .push((prefix.to_string(), Err(stderr.to_string())));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn head(&self) -> String {
        self.head.borrow().clone()
    }

    /// Drops the recorded command history.
    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl GitRunner for FakeGit {
    fn git_with_input(&self, args: &[&str], input: Option<&str>) -> StResult<String> {
        let command = args.join(" ");
        self.calls.borrow_mut().push(command.clone());

        let scripted = {
            let mut scripted = self.scripted.borrow_mut();
            scripted
                .iter()
                .position(|(prefix, _)| command.starts_with(prefix.as_str()))
                .map(|i| scripted.remove(i).1)
        };
        if let Some(result) = scripted {
            return result.map_err(|stderr| StError::GitCommand { command, stderr });
        }

        match args {
            ["checkout", "-b", branch] | ["checkout", branch] => {
                *self.head.borrow_mut() = branch.to_string();
                Ok(String::new())
            }
            ["rev-parse", "--abbrev-ref", "HEAD"] => Ok(format!("{}\n", self.head.borrow())),
            ["config", "--local", "--get", key] => {
                self.config.borrow().get(*key).map(|v| format!("{v}\n")).ok_or(
                    StError::GitCommand {
                        command,
                        stderr: String::new(),
                    },
                )
            }
            ["config", "--local", key, value] => {
                self.config
                    .borrow_mut()
                    .insert(key.to_string(), value.to_string());
                Ok(String::new())
            }
            ["config", "user.name"] => Ok("Jane Doe\n".to_string()),
            ["hash-object", "--stdin"] => {
                let mut hasher = DefaultHasher::new();
                input.unwrap_or_default().hash(&mut hasher);
                let low = hasher.finish();
                "salt".hash(&mut hasher);
                Ok(format!("{:016x}{:016x}{:08x}\n", low, hasher.finish(), low as u32))
            }
            _ => Ok(String::new()),
        }
    }
}

/// An in-memory [ReviewRequests] implementation.
pub(crate) struct FakeReviews {
    state: Mutex<FakeReviewsState>,
}

#[derive(Default)]
struct FakeReviewsState {
    merge_requests: Vec<MergeRequest>,
    created: Vec<MergeRequest>,
    assignees: Vec<u64>,
}

impl FakeReviews {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeReviewsState::default()),
        }
    }

    /// Registers an existing merge request and returns its URL.
    pub(crate) fn insert(
        &self,
        source_branch: &str,
        target_branch: &str,
        state: MergeRequestState,
    ) -> String {
        let mut inner = self.state.lock().unwrap();
        let mr = fake_merge_request(
            inner.merge_requests.len() as u64 + 1,
            source_branch,
            target_branch,
            source_branch,
            state,
        );
        let url = mr.web_url.clone();
        inner.merge_requests.push(mr);
        url
    }

    /// Updates the state of the merge request with the given URL.
    pub(crate) fn set_state(&self, url: &str, state: MergeRequestState) {
        let mut inner = self.state.lock().unwrap();
        let mr = inner
            .merge_requests
            .iter_mut()
            .find(|mr| mr.web_url == url)
            .unwrap();
        mr.state = state;
    }

    /// Merge requests created through [ReviewRequests::create].
    pub(crate) fn created(&self) -> Vec<MergeRequest> {
        self.state.lock().unwrap().created.clone()
    }

    pub(crate) fn assignees(&self) -> Vec<u64> {
        self.state.lock().unwrap().assignees.clone()
    }
}

fn fake_merge_request(
    iid: u64,
    source_branch: &str,
    target_branch: &str,
    title: &str,
    state: MergeRequestState,
) -> MergeRequest {
    MergeRequest {
        iid,
        title: title.to_string(),
        state,
        web_url: format!("https://gitlab.example.com/group/project/-/merge_requests/{iid}"),
        source_branch: source_branch.to_string(),
        target_branch: target_branch.to_string(),
    }
}

#[async_trait]
impl ReviewRequests for FakeReviews {
    async fn current_user(&self) -> StResult<User> {
        Ok(User {
            id: 7,
            username: "jdoe".to_string(),
        })
    }

    async fn default_branch(&self) -> StResult<String> {
        Ok("main".to_string())
    }

    async fn find_open(&self, source_branch: &str) -> StResult<Option<MergeRequest>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .merge_requests
            .iter()
            .find(|mr| mr.source_branch == source_branch && mr.state == MergeRequestState::Opened)
            .cloned())
    }

    async fn create(&self, new: &NewMergeRequest<'_>) -> StResult<MergeRequest> {
        let mut inner = self.state.lock().unwrap();
        let mr = fake_merge_request(
            inner.merge_requests.len() as u64 + 1,
            new.source_branch,
            new.target_branch,
            new.title,
            MergeRequestState::Opened,
        );
        inner.merge_requests.push(mr.clone());
        inner.created.push(mr.clone());
        inner.assignees.push(new.assignee_id);
        Ok(mr)
    }

    async fn get(&self, iid: u64) -> StResult<MergeRequest> {
        self.state
            .lock()
            .unwrap()
            .merge_requests
            .iter()
            .find(|mr| mr.iid == iid)
            .cloned()
            .ok_or(StError::ApiStatus {
                op: "fetch merge request",
                status: 404,
                message: "404 Not found".to_string(),
            })
    }
}
