//! Run reconciliation and cancellation.
//!
//! Given the resolved check suites, the [`Reconciler`] filters them, lists
//! their `pull_request` workflow runs, deduplicates by run id, filters runs by
//! self-exclusion and liveness, and drives each remaining run through the
//! cancellation state machine in [`cancel`].
//!
//! Suites are processed concurrently, and so are the runs within a suite.
//! Branches share only the seen-run set and the request counter.

pub mod cancel;
pub mod filter;

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use futures::future::join_all;

use crate::config::ReconcileConfig;
use crate::effects::{ActionsEffect, ActionsInterpreter, ActionsResponse};
use crate::output;
use crate::types::{CheckSuite, RunId, Sha, WorkflowRun};

pub use cancel::{CancelAttempt, CancelOutcome, CancelStep};
pub use filter::{RunVerdict, SuiteVerdict, classify_check_suite, classify_workflow_run};

/// What the pass is reconciling against.
#[derive(Debug, Clone)]
pub struct ReconcileTarget {
    /// The pull request's current head commit.
    pub head_sha: Sha,
    /// The run executing this pass.
    pub self_run: RunId,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Cancellation requests issued (normal and forceful, including failed
    /// and dry-run-suppressed ones).
    pub requests_issued: u32,

    /// Terminal outcome of every run that entered the cancellation protocol.
    pub outcomes: BTreeMap<RunId, CancelOutcome>,
}

impl ReconcileSummary {
    pub fn count(&self, outcome: CancelOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

/// Pass-scoped reconciliation state. Constructed once per invocation.
pub struct Reconciler<'a, I> {
    interpreter: &'a I,
    target: ReconcileTarget,
    config: &'a ReconcileConfig,
    dry_run: bool,
    seen: Mutex<HashSet<RunId>>,
    issued: AtomicU32,
}

impl<'a, I: ActionsInterpreter> Reconciler<'a, I> {
    pub fn new(
        interpreter: &'a I,
        target: ReconcileTarget,
        config: &'a ReconcileConfig,
        dry_run: bool,
    ) -> Self {
        Reconciler {
            interpreter,
            target,
            config,
            dry_run,
            seen: Mutex::new(HashSet::new()),
            issued: AtomicU32::new(0),
        }
    }

    /// Runs the pass over `suites`. Consumes the reconciler: a pass is never
    /// re-entered.
    pub async fn reconcile(self, suites: &[CheckSuite]) -> ReconcileSummary {
        let per_suite = join_all(suites.iter().map(|suite| self.process_check_suite(suite))).await;

        ReconcileSummary {
            requests_issued: self.issued.into_inner(),
            outcomes: per_suite.into_iter().flatten().collect(),
        }
    }

    async fn process_check_suite(&self, suite: &CheckSuite) -> Vec<(RunId, CancelOutcome)> {
        output::dump_group(&format!("Check suite {}", suite.id), suite);

        let verdict = classify_check_suite(suite, &self.target.head_sha, self.config);
        if verdict != SuiteVerdict::Accept {
            tracing::info!(check_suite = %suite.id, ?verdict, "Skipping check suite");
            return Vec::new();
        }

        let runs = self.list_unseen_runs(suite).await;
        tracing::debug!(check_suite = %suite.id, runs = runs.len(), "Enumerated workflow runs");

        join_all(runs.iter().map(|run| self.process_workflow_run(run)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Lists the suite's runs once per configured status, keeping only runs
    /// not already claimed by this pass.
    ///
    /// A failed listing is logged and skipped; it never aborts the pass.
    async fn list_unseen_runs(&self, suite: &CheckSuite) -> Vec<WorkflowRun> {
        let mut runs = Vec::new();
        for status in &self.config.query_statuses {
            let effect = ActionsEffect::ListWorkflowRuns {
                check_suite: suite.id,
                event: Some(self.config.event.clone()),
                status: Some(status.clone()),
            };
            match self.interpreter.interpret(effect).await {
                Ok(ActionsResponse::WorkflowRuns(found)) => {
                    runs.extend(found.into_iter().filter(|run| self.claim(run.id)));
                }
                Ok(other) => tracing::warn!(
                    check_suite = %suite.id,
                    response = other.name(),
                    "Unexpected response listing workflow runs"
                ),
                Err(e) => tracing::error!(
                    check_suite = %suite.id,
                    %status,
                    error = %e,
                    "Failed to list workflow runs"
                ),
            }
        }
        runs
    }

    async fn process_workflow_run(&self, run: &WorkflowRun) -> Option<(RunId, CancelOutcome)> {
        output::dump_group(&format!("Workflow run {}", run.id), run);

        match classify_workflow_run(run, self.target.self_run, self.config) {
            RunVerdict::Candidate => Some((run.id, self.cancel_run(run).await)),
            verdict => {
                tracing::info!(run = %run.id, ?verdict, "Skipping workflow run");
                None
            }
        }
    }

    /// Marks `run` as processed. Returns false if it already was.
    fn claim(&self, run: RunId) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(run)
    }

    fn record_request(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}
