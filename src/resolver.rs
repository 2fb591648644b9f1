//! Check-suite resolution for the pull request's head commit.
//!
//! GitHub creates check suites asynchronously after a push, so the first
//! listing can come back empty or with only some of the suites. The resolver
//! re-queries a bounded number of times: once the listing is non-empty and the
//! newest suite is older than the creation grace period, siblings are assumed
//! to exist too.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::ResolverConfig;
use crate::effects::{ActionsEffect, ActionsInterpreter, ActionsResponse};
use crate::pass::PassError;
use crate::types::{CheckSuite, Sha};

/// Lists the check suites for `head_sha`, waiting out creation lag.
///
/// After `max_attempts` queries the last result is returned as-is, even if
/// empty. A failed query aborts resolution.
pub async fn resolve_check_suites<I: ActionsInterpreter>(
    interpreter: &I,
    head_sha: &Sha,
    config: &ResolverConfig,
) -> Result<Vec<CheckSuite>, PassError> {
    let mut attempt = 1;
    loop {
        let suites = list_check_suites(interpreter, head_sha).await?;
        tracing::debug!(
            sha = %head_sha,
            attempt,
            count = suites.len(),
            "Listed check suites"
        );

        if attempt >= config.max_attempts {
            return Ok(suites);
        }
        let Some(delay) = settle_delay(&suites, Utc::now(), config) else {
            return Ok(suites);
        };

        tracing::info!(
            sha = %head_sha,
            found = suites.len(),
            ?delay,
            "Check suites may still be materializing, querying again after delay"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// How long to wait before re-querying, or `None` if `suites` look complete.
///
/// - no suites: `empty_retry_delay`
/// - newest suite created less than `creation_grace` before `now`: the rest
///   of the grace period
pub fn settle_delay(
    suites: &[CheckSuite],
    now: DateTime<Utc>,
    config: &ResolverConfig,
) -> Option<Duration> {
    let Some(newest) = suites.iter().map(|s| s.created_at).max() else {
        return Some(config.empty_retry_delay);
    };

    let grace = TimeDelta::from_std(config.creation_grace).unwrap_or(TimeDelta::MAX);
    let settled_at = newest.checked_add_signed(grace)?;
    if settled_at <= now {
        return None;
    }
    // A creation time in the future (clock skew) waits at most the full grace.
    Some((settled_at - now).to_std().map_or(config.creation_grace, |d| {
        d.min(config.creation_grace)
    }))
}

async fn list_check_suites<I: ActionsInterpreter>(
    interpreter: &I,
    head_sha: &Sha,
) -> Result<Vec<CheckSuite>, PassError> {
    let effect = ActionsEffect::ListCheckSuites {
        head_sha: head_sha.clone(),
    };
    match interpreter.interpret(effect).await {
        Ok(ActionsResponse::CheckSuites(suites)) => Ok(suites),
        Ok(other) => Err(PassError::UnexpectedResponse {
            effect: "list_check_suites",
            response: other.name(),
        }),
        Err(e) => Err(PassError::ListCheckSuites(Box::new(e))),
    }
}
