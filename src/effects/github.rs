//! GitHub Actions effect types.
//!
//! These types describe the platform operations the pass needs, without
//! executing them. The octocrab-backed interpreter lives in `crate::github`.

use serde::{Deserialize, Serialize};

use crate::types::{CheckSuite, CheckSuiteId, RunId, RunStatus, Sha, WorkflowRun};

/// A GitHub Actions API effect.
///
/// Effects are repo-scoped: the interpreter is constructed with a `RepoId`, so
/// effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionsEffect {
    // ─── Queries ──────────────────────────────────────────────────────────────
    /// List every check suite for a commit (all pages).
    ListCheckSuites { head_sha: Sha },

    /// List the workflow runs of one check suite (all pages), optionally
    /// filtered by triggering event and status.
    ListWorkflowRuns {
        check_suite: CheckSuiteId,
        event: Option<String>,
        status: Option<RunStatus>,
    },

    /// Fetch a single workflow run.
    GetWorkflowRun { run: RunId },

    // ─── Mutations ────────────────────────────────────────────────────────────
    /// Request cancellation of a workflow run.
    CancelWorkflowRun { run: RunId },

    /// Forcefully cancel a workflow run, bypassing `always()` conditions.
    ForceCancelWorkflowRun { run: RunId },
}

impl ActionsEffect {
    /// Returns true if this effect changes platform state.
    ///
    /// Mutations are never retried by the interpreter and are suppressed in
    /// dry-run mode.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ActionsEffect::CancelWorkflowRun { .. } | ActionsEffect::ForceCancelWorkflowRun { .. }
        )
    }

    /// Short name for log lines and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ActionsEffect::ListCheckSuites { .. } => "list_check_suites",
            ActionsEffect::ListWorkflowRuns { .. } => "list_workflow_runs",
            ActionsEffect::GetWorkflowRun { .. } => "get_workflow_run",
            ActionsEffect::CancelWorkflowRun { .. } => "cancel_workflow_run",
            ActionsEffect::ForceCancelWorkflowRun { .. } => "force_cancel_workflow_run",
        }
    }
}

/// Response from an Actions effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionsResponse {
    /// Response to `ListCheckSuites`.
    CheckSuites(Vec<CheckSuite>),

    /// Response to `ListWorkflowRuns`.
    WorkflowRuns(Vec<WorkflowRun>),

    /// Response to `GetWorkflowRun`.
    WorkflowRun(WorkflowRun),

    /// Response to either cancellation effect. The platform acknowledges the
    /// request; the run finishes asynchronously.
    CancelRequested,
}

impl ActionsResponse {
    /// Short name of the variant, for mismatch diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ActionsResponse::CheckSuites(_) => "check_suites",
            ActionsResponse::WorkflowRuns(_) => "workflow_runs",
            ActionsResponse::WorkflowRun(_) => "workflow_run",
            ActionsResponse::CancelRequested => "cancel_requested",
        }
    }
}
