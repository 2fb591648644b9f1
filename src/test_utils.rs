//! Shared test fixtures and a scripted, recording Actions interpreter.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::DateTime;

use crate::effects::{ActionsEffect, ActionsInterpreter, ActionsResponse};
use crate::github::GitHubApiError;
use crate::types::{CheckSuite, CheckSuiteId, RunId, RunStatus, Sha, WorkflowRun};

/// A check suite created long ago (settled), with no associated PRs.
pub fn check_suite(id: u64, slug: &str, head_sha: &str, status: Option<RunStatus>) -> CheckSuite {
    CheckSuite {
        id: CheckSuiteId(id),
        app_slug: Some(slug.to_string()),
        head_sha: Sha::new(head_sha),
        status,
        created_at: DateTime::UNIX_EPOCH,
        pull_requests: Vec::new(),
    }
}

/// A `pull_request` workflow run.
pub fn workflow_run(id: u64, status: Option<RunStatus>) -> WorkflowRun {
    WorkflowRun {
        id: RunId(id),
        name: Some("CI".to_string()),
        url: format!("https://github.com/octo/widgets/actions/runs/{}", id),
        status,
        conclusion: None,
        event: "pull_request".to_string(),
    }
}

type Scripted<T> = VecDeque<Result<T, GitHubApiError>>;

/// Mock interpreter with scripted responses. Every effect it receives is
/// recorded, including ones whose scripted response is an error.
///
/// - `ListCheckSuites`: pops the next scripted listing; errors if none left.
/// - `ListWorkflowRuns`: the runs registered for `(check_suite, status)`, or
///   an empty list.
/// - `GetWorkflowRun`: pops scripted refreshes; the last successful one repeats.
/// - Cancellations: succeed unless a failure budget was set for the run.
#[derive(Default)]
pub struct MockActions {
    check_suites: Mutex<Scripted<Vec<CheckSuite>>>,
    runs: Mutex<HashMap<(CheckSuiteId, Option<RunStatus>), Scripted<Vec<WorkflowRun>>>>,
    refreshes: Mutex<HashMap<RunId, Scripted<WorkflowRun>>>,
    cancel_failures: Mutex<HashMap<RunId, u32>>,
    effects: Mutex<Vec<ActionsEffect>>,
}

impl MockActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_check_suites(&self, suites: Vec<CheckSuite>) {
        self.check_suites.lock().unwrap().push_back(Ok(suites));
    }

    pub fn fail_check_suites(&self, err: GitHubApiError) {
        self.check_suites.lock().unwrap().push_back(Err(err));
    }

    /// Registers the listing returned for a status-filtered query.
    pub fn set_runs(&self, suite: CheckSuiteId, status: RunStatus, runs: Vec<WorkflowRun>) {
        self.runs
            .lock()
            .unwrap()
            .insert((suite, Some(status)), VecDeque::from([Ok(runs)]));
    }

    /// Registers each run under the query for its own current status.
    pub fn add_runs(&self, suite: CheckSuiteId, runs: Vec<WorkflowRun>) {
        let mut listings = self.runs.lock().unwrap();
        for run in runs {
            let entry = listings
                .entry((suite, run.status.clone()))
                .or_insert_with(|| VecDeque::from([Ok(Vec::new())]));
            if let Some(Ok(listed)) = entry.front_mut() {
                listed.push(run);
            }
        }
    }

    pub fn fail_runs(&self, suite: CheckSuiteId, status: RunStatus, err: GitHubApiError) {
        self.runs
            .lock()
            .unwrap()
            .insert((suite, Some(status)), VecDeque::from([Err(err)]));
    }

    pub fn push_refreshes(&self, run: RunId, states: Vec<WorkflowRun>) {
        let mut refreshes = self.refreshes.lock().unwrap();
        let queue = refreshes.entry(run).or_default();
        queue.extend(states.into_iter().map(Ok));
    }

    pub fn fail_refresh(&self, run: RunId, err: GitHubApiError) {
        self.refreshes
            .lock()
            .unwrap()
            .entry(run)
            .or_default()
            .push_back(Err(err));
    }

    /// The next `count` cancellation requests (normal or forceful) for `run` fail.
    pub fn fail_cancels(&self, run: RunId, count: u32) {
        self.cancel_failures.lock().unwrap().insert(run, count);
    }

    pub fn effects(&self) -> Vec<ActionsEffect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn count_effects(&self, pred: impl Fn(&ActionsEffect) -> bool) -> usize {
        self.effects.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    /// Every mutating request received.
    pub fn mutations(&self) -> Vec<ActionsEffect> {
        self.effects()
            .into_iter()
            .filter(ActionsEffect::is_mutation)
            .collect()
    }

    pub fn cancels_for(&self, run: RunId) -> usize {
        self.count_effects(|e| *e == ActionsEffect::CancelWorkflowRun { run })
    }

    pub fn force_cancels_for(&self, run: RunId) -> usize {
        self.count_effects(|e| *e == ActionsEffect::ForceCancelWorkflowRun { run })
    }

    fn respond(&self, effect: ActionsEffect) -> Result<ActionsResponse, GitHubApiError> {
        match effect {
            ActionsEffect::ListCheckSuites { .. } => self
                .check_suites
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GitHubApiError::permanent_without_source("no listing scripted")))
                .map(ActionsResponse::CheckSuites),
            ActionsEffect::ListWorkflowRuns {
                check_suite,
                status,
                ..
            } => {
                let mut runs = self.runs.lock().unwrap();
                match runs.get_mut(&(check_suite, status)) {
                    Some(queue) => pop_or_repeat(queue, "no runs scripted"),
                    None => Ok(Vec::new()),
                }
                .map(ActionsResponse::WorkflowRuns)
            }
            ActionsEffect::GetWorkflowRun { run } => {
                let mut refreshes = self.refreshes.lock().unwrap();
                match refreshes.get_mut(&run) {
                    Some(queue) => pop_or_repeat(queue, "run not found"),
                    None => Err(GitHubApiError::permanent_without_source("run not found")),
                }
                .map(ActionsResponse::WorkflowRun)
            }
            ActionsEffect::CancelWorkflowRun { run }
            | ActionsEffect::ForceCancelWorkflowRun { run } => {
                let mut failures = self.cancel_failures.lock().unwrap();
                match failures.get_mut(&run) {
                    Some(remaining) if *remaining > 0 => {
                        *remaining -= 1;
                        Err(GitHubApiError::transient_without_source("502 bad gateway"))
                    }
                    _ => Ok(ActionsResponse::CancelRequested),
                }
            }
        }
    }
}

/// Pops the front of `queue`, except that a lone successful entry is cloned
/// so the final scripted state persists.
fn pop_or_repeat<T: Clone>(queue: &mut Scripted<T>, empty: &str) -> Result<T, GitHubApiError> {
    if queue.len() == 1
        && let Some(Ok(last)) = queue.front()
    {
        return Ok(last.clone());
    }
    queue
        .pop_front()
        .unwrap_or_else(|| Err(GitHubApiError::permanent_without_source(empty)))
}

impl ActionsInterpreter for MockActions {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: ActionsEffect) -> Result<ActionsResponse, Self::Error> {
        self.effects.lock().unwrap().push(effect.clone());
        self.respond(effect)
    }
}
