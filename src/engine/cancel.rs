//! Per-run cancellation protocol.
//!
//! GitHub processes cancellation asynchronously and occasionally ignores a
//! request, so a run is nudged repeatedly:
//!
//! ```text
//!            attempt 1                 attempt n > 1
//!   Pending ──────────► cancel ──wait──► refresh status
//!                                          │
//!          ┌───────────────────────────────┼──────────────────────────┐
//!          ▼                               ▼                          ▼
//!   not live: Cancelled/Abandoned   live, n <= budget: cancel   live, n > budget:
//!                                   (wait, n += 1, repeat)      force cancel, Escalated
//! ```
//!
//! The loop is bounded by the attempt budget: at most `budget` normal requests
//! and one forceful request per run.

use crate::effects::{ActionsEffect, ActionsInterpreter, ActionsResponse};
use crate::types::{CANCELLED_CONCLUSION, LiveStatuses, RunStatus, WorkflowRun};

use super::Reconciler;

/// Where a run stands in the cancellation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelOutcome {
    /// Still being driven.
    Pending,
    /// Observed finished with conclusion `cancelled`.
    Cancelled,
    /// The budget ran out and a forceful cancellation was issued.
    Escalated,
    /// Observed finished for some other reason; nothing more to do.
    Abandoned,
}

/// What the next attempt should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelStep {
    Cancel,
    ForceCancel,
    Finish(CancelOutcome),
}

/// Ephemeral attempt state for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAttempt {
    attempt: u32,
    status: Option<RunStatus>,
    conclusion: Option<String>,
    outcome: CancelOutcome,
}

impl CancelAttempt {
    /// Starts at attempt 1 with the status seen when the run was listed.
    pub fn new(run: &WorkflowRun) -> Self {
        CancelAttempt {
            attempt: 1,
            status: run.status.clone(),
            conclusion: run.conclusion.clone(),
            outcome: CancelOutcome::Pending,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn outcome(&self) -> CancelOutcome {
        self.outcome
    }

    /// Records a freshly fetched copy of the run.
    pub fn observe(&mut self, run: &WorkflowRun) {
        self.status = run.status.clone();
        self.conclusion = run.conclusion.clone();
    }

    /// Decides the current attempt from the last observation.
    pub fn next_step(&self, live: &LiveStatuses, budget: u32) -> CancelStep {
        if !live.is_live(self.status.as_ref()) {
            let outcome = if self.conclusion.as_deref() == Some(CANCELLED_CONCLUSION) {
                CancelOutcome::Cancelled
            } else {
                CancelOutcome::Abandoned
            };
            return CancelStep::Finish(outcome);
        }
        if self.attempt <= budget {
            CancelStep::Cancel
        } else {
            CancelStep::ForceCancel
        }
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }

    pub fn finish(&mut self, outcome: CancelOutcome) {
        self.outcome = outcome;
    }
}

impl<I: ActionsInterpreter> Reconciler<'_, I> {
    /// Drives `run` through the protocol until a terminal outcome.
    pub(super) async fn cancel_run(&self, run: &WorkflowRun) -> CancelOutcome {
        let mut state = CancelAttempt::new(run);

        loop {
            if state.attempt() > 1 {
                self.refresh(run, &mut state).await;
            }

            match state.next_step(&self.config.live, self.config.max_cancel_attempts) {
                CancelStep::Finish(outcome) => {
                    state.finish(outcome);
                    tracing::info!(
                        run = %run.id,
                        attempt = state.attempt(),
                        ?outcome,
                        "Workflow run no longer live"
                    );
                    return outcome;
                }
                CancelStep::Cancel => {
                    self.send(ActionsEffect::CancelWorkflowRun { run: run.id }, &state)
                        .await;
                }
                CancelStep::ForceCancel => {
                    self.send(ActionsEffect::ForceCancelWorkflowRun { run: run.id }, &state)
                        .await;
                    state.finish(CancelOutcome::Escalated);
                    tracing::warn!(
                        run = %run.id,
                        url = %run.url,
                        attempts = state.attempt(),
                        "Cancellation budget exhausted, escalated to force cancel"
                    );
                    return CancelOutcome::Escalated;
                }
            }

            tokio::time::sleep(self.config.retry_delay).await;
            state.advance();
        }
    }

    /// Re-fetches the run. On failure the previous observation is kept.
    async fn refresh(&self, run: &WorkflowRun, state: &mut CancelAttempt) {
        match self
            .interpreter
            .interpret(ActionsEffect::GetWorkflowRun { run: run.id })
            .await
        {
            Ok(ActionsResponse::WorkflowRun(fresh)) => {
                tracing::debug!(
                    run = %run.id,
                    attempt = state.attempt(),
                    status = ?fresh.status,
                    "Refreshed workflow run"
                );
                state.observe(&fresh);
            }
            Ok(other) => tracing::warn!(
                run = %run.id,
                response = other.name(),
                "Unexpected response refreshing workflow run"
            ),
            Err(e) => tracing::warn!(
                run = %run.id,
                attempt = state.attempt(),
                error = %e,
                "Failed to refresh workflow run, keeping last observed status"
            ),
        }
    }

    /// Counts and (unless dry-running) sends a cancellation request.
    ///
    /// A failed request is logged; the caller's loop decides what happens next.
    async fn send(&self, effect: ActionsEffect, state: &CancelAttempt) {
        self.record_request();
        let name = effect.name();

        if self.dry_run {
            tracing::info!(effect = name, attempt = state.attempt(), "Dry run, not sending {:?}", effect);
            return;
        }

        match self.interpreter.interpret(effect).await {
            Ok(_) => tracing::info!(effect = name, attempt = state.attempt(), "Cancellation requested"),
            Err(e) => tracing::error!(
                effect = name,
                attempt = state.attempt(),
                error = %e,
                "Cancellation request failed"
            ),
        }
    }
}
