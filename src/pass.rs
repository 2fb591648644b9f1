//! One reconciliation pass: trigger check, suite resolution, reconciliation.

use thiserror::Error;

use crate::config::Config;
use crate::effects::ActionsInterpreter;
use crate::engine::{CancelOutcome, ReconcileSummary, ReconcileTarget, Reconciler};
use crate::event::TriggerContext;
use crate::output;
use crate::resolver::resolve_check_suites;
use crate::types::PULL_REQUEST_EVENT;

/// Fatal pass failure.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("failed to list check suites: {0}")]
    ListCheckSuites(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected response to {effect}: {response}")]
    UnexpectedResponse {
        effect: &'static str,
        response: &'static str,
    },
}

/// Runs one pass for the triggering pull request.
///
/// A trigger that is not a pull request event is not an error: a warning is
/// emitted and the summary is empty.
pub async fn run_pass<I: ActionsInterpreter>(
    interpreter: &I,
    config: &Config,
    context: &TriggerContext,
) -> Result<ReconcileSummary, PassError> {
    if let Some(payload) = &context.pull_request_payload {
        output::dump_group("Pull request", payload);
    }

    let pull_request = match &context.pull_request {
        Some(pr) if context.event_name == PULL_REQUEST_EVENT => pr,
        _ => {
            let message = format!(
                "This action should be executed on '{}' events. The current event: '{}'.",
                PULL_REQUEST_EVENT, context.event_name
            );
            tracing::warn!(event = %context.event_name, "Not a pull request event, nothing to do");
            output::warning(&message);
            return Ok(ReconcileSummary::default());
        }
    };

    tracing::info!(
        repo = %context.repo,
        pr = %pull_request.number,
        sha = %pull_request.head_sha.short(),
        run = %context.run_id,
        dry_run = config.dry_run,
        "Reconciling workflow runs"
    );

    let suites =
        resolve_check_suites(interpreter, &pull_request.head_sha, &config.resolver).await?;
    tracing::info!(count = suites.len(), "Resolved check suites");

    let target = ReconcileTarget {
        head_sha: pull_request.head_sha.clone(),
        self_run: context.run_id,
    };
    let summary = Reconciler::new(interpreter, target, &config.reconcile, config.dry_run)
        .reconcile(&suites)
        .await;

    tracing::info!(
        requests = summary.requests_issued,
        cancelled = summary.count(CancelOutcome::Cancelled),
        escalated = summary.count(CancelOutcome::Escalated),
        abandoned = summary.count(CancelOutcome::Abandoned),
        "Pass complete"
    );
    Ok(summary)
}
