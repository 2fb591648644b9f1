//! Classification of check suites and workflow runs.
//!
//! Pure functions of the observed platform state. Checks run in a fixed order
//! and the first failing one decides the verdict, so log lines always name the
//! same reason for the same input.

use crate::config::ReconcileConfig;
use crate::types::{CheckSuite, RunId, RunStatus, Sha, WorkflowRun};

/// Why a check suite was or wasn't accepted for run enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteVerdict {
    Accept,
    /// Owned by an app other than the configured CI app.
    ForeignApp { slug: Option<String> },
    /// Created for a commit that is no longer the pull request's head.
    StaleHead { head_sha: Sha },
    /// Already finished; none of its runs can be live.
    Finished { status: RunStatus },
}

/// Why a workflow run was or wasn't selected for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunVerdict {
    Candidate,
    /// The run executing this pass.
    SelfRun,
    /// Triggered by something other than the configured event.
    OtherEvent { event: String },
    /// Status absent or outside the live set.
    NotLive { status: Option<RunStatus> },
}

pub fn classify_check_suite(
    suite: &CheckSuite,
    head_sha: &Sha,
    config: &ReconcileConfig,
) -> SuiteVerdict {
    if suite.app_slug.as_deref() != Some(config.app_slug.as_str()) {
        return SuiteVerdict::ForeignApp {
            slug: suite.app_slug.clone(),
        };
    }
    if &suite.head_sha != head_sha {
        return SuiteVerdict::StaleHead {
            head_sha: suite.head_sha.clone(),
        };
    }
    match &suite.status {
        Some(status) if !config.live.contains(status) => SuiteVerdict::Finished {
            status: status.clone(),
        },
        _ => SuiteVerdict::Accept,
    }
}

pub fn classify_workflow_run(
    run: &WorkflowRun,
    self_run: RunId,
    config: &ReconcileConfig,
) -> RunVerdict {
    if run.id == self_run {
        return RunVerdict::SelfRun;
    }
    if run.event != config.event {
        return RunVerdict::OtherEvent {
            event: run.event.clone(),
        };
    }
    if !config.live.is_live(run.status.as_ref()) {
        return RunVerdict::NotLive {
            status: run.status.clone(),
        };
    }
    RunVerdict::Candidate
}
