//! Actions effect interpreter using octocrab.
//!
//! Reads go through octocrab's typed `get` with our own minimal response
//! structs; the two cancel endpoints return 202 with no useful body, so they
//! use the raw `_post` and only check the status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::{ActionsEffect, ActionsInterpreter, ActionsResponse};
use crate::types::{
    CheckSuite, CheckSuiteId, PrNumber, RunId, RunStatus, Sha, WorkflowRun,
};

use super::client::OctocrabClient;
use super::error::GitHubApiError;
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

const PER_PAGE: u32 = 100;

/// Safety limit to prevent runaway pagination.
const MAX_PAGES: u32 = 10;

// ─── Raw Response Types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawCheckSuitePage {
    check_suites: Vec<RawCheckSuite>,
}

#[derive(Debug, Deserialize)]
struct RawCheckSuite {
    id: u64,
    app: Option<RawApp>,
    head_sha: String,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pull_requests: Option<Vec<RawPrRef>>,
}

#[derive(Debug, Deserialize)]
struct RawApp {
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrRef {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawWorkflowRunPage {
    workflow_runs: Vec<RawWorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflowRun {
    id: u64,
    name: Option<String>,
    html_url: Option<String>,
    url: String,
    status: Option<String>,
    conclusion: Option<String>,
    event: String,
}

impl From<RawCheckSuite> for CheckSuite {
    fn from(raw: RawCheckSuite) -> Self {
        CheckSuite {
            id: CheckSuiteId(raw.id),
            app_slug: raw.app.and_then(|app| app.slug),
            head_sha: Sha(raw.head_sha),
            status: raw.status.map(RunStatus::from),
            // A suite without a timestamp is treated as long settled.
            created_at: raw.created_at.unwrap_or(DateTime::UNIX_EPOCH),
            pull_requests: raw
                .pull_requests
                .unwrap_or_default()
                .into_iter()
                .map(|pr| PrNumber(pr.number))
                .collect(),
        }
    }
}

impl From<RawWorkflowRun> for WorkflowRun {
    fn from(raw: RawWorkflowRun) -> Self {
        WorkflowRun {
            id: RunId(raw.id),
            name: raw.name,
            url: raw.html_url.unwrap_or(raw.url),
            status: raw.status.map(RunStatus::from),
            conclusion: raw.conclusion,
            event: raw.event,
        }
    }
}

#[derive(Serialize)]
struct PageQuery<'a> {
    per_page: u32,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_suite_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

impl PageQuery<'_> {
    fn page(page: u32) -> Self {
        PageQuery {
            per_page: PER_PAGE,
            page,
            check_suite_id: None,
            event: None,
            status: None,
        }
    }
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl ActionsInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: ActionsEffect) -> Result<ActionsResponse, Self::Error> {
        interpret_actions_effect(self, effect, RetryConfig::DEFAULT).await
    }
}

/// Interprets an Actions effect against the GitHub API.
///
/// Reads are retried on transient errors; mutations are attempted once.
pub async fn interpret_actions_effect(
    client: &OctocrabClient,
    effect: ActionsEffect,
    retry_config: RetryConfig,
) -> Result<ActionsResponse, GitHubApiError> {
    let policy = RetryPolicy::for_effect(&effect);
    retry_with_backoff(retry_config, policy, || execute_effect(client, effect.clone())).await
}

async fn execute_effect(
    client: &OctocrabClient,
    effect: ActionsEffect,
) -> Result<ActionsResponse, GitHubApiError> {
    match effect {
        ActionsEffect::ListCheckSuites { head_sha } => list_check_suites(client, &head_sha).await,
        ActionsEffect::ListWorkflowRuns {
            check_suite,
            event,
            status,
        } => list_workflow_runs(client, check_suite, event.as_deref(), status.as_ref()).await,
        ActionsEffect::GetWorkflowRun { run } => get_workflow_run(client, run).await,
        ActionsEffect::CancelWorkflowRun { run } => post_cancel(client, run, "cancel").await,
        ActionsEffect::ForceCancelWorkflowRun { run } => {
            post_cancel(client, run, "force-cancel").await
        }
    }
}

// ─── Queries ──────────────────────────────────────────────────────────────────

async fn list_check_suites(
    client: &OctocrabClient,
    head_sha: &Sha,
) -> Result<ActionsResponse, GitHubApiError> {
    let route = client.route(&format!("commits/{}/check-suites", head_sha));
    let mut suites = Vec::new();

    for page in 1..=MAX_PAGES {
        let result: RawCheckSuitePage = client
            .inner()
            .get(&route, Some(&PageQuery::page(page)))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = result.check_suites.len() < PER_PAGE as usize;
        suites.extend(result.check_suites.into_iter().map(CheckSuite::from));
        if is_last_page {
            return Ok(ActionsResponse::CheckSuites(suites));
        }
    }

    tracing::warn!(
        sha = %head_sha,
        suites = suites.len(),
        "Hit pagination limit listing check suites; results may be incomplete"
    );
    Ok(ActionsResponse::CheckSuites(suites))
}

async fn list_workflow_runs(
    client: &OctocrabClient,
    check_suite: CheckSuiteId,
    event: Option<&str>,
    status: Option<&RunStatus>,
) -> Result<ActionsResponse, GitHubApiError> {
    let route = client.route("actions/runs");
    let mut runs = Vec::new();

    for page in 1..=MAX_PAGES {
        let query = PageQuery {
            check_suite_id: Some(check_suite.0),
            event,
            status: status.map(RunStatus::as_api_str),
            ..PageQuery::page(page)
        };
        let result: RawWorkflowRunPage = client
            .inner()
            .get(&route, Some(&query))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = result.workflow_runs.len() < PER_PAGE as usize;
        runs.extend(result.workflow_runs.into_iter().map(WorkflowRun::from));
        if is_last_page {
            return Ok(ActionsResponse::WorkflowRuns(runs));
        }
    }

    tracing::warn!(
        check_suite = %check_suite,
        runs = runs.len(),
        "Hit pagination limit listing workflow runs; results may be incomplete"
    );
    Ok(ActionsResponse::WorkflowRuns(runs))
}

async fn get_workflow_run(
    client: &OctocrabClient,
    run: RunId,
) -> Result<ActionsResponse, GitHubApiError> {
    let route = client.route(&format!("actions/runs/{}", run));
    let raw: RawWorkflowRun = client
        .inner()
        .get(&route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    Ok(ActionsResponse::WorkflowRun(raw.into()))
}

// ─── Mutations ────────────────────────────────────────────────────────────────

async fn post_cancel(
    client: &OctocrabClient,
    run: RunId,
    action: &str,
) -> Result<ActionsResponse, GitHubApiError> {
    let route = client.route(&format!("actions/runs/{}/{}", run, action));
    let response = client
        .inner()
        ._post(route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    octocrab::map_github_error(response)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    Ok(ActionsResponse::CancelRequested)
}
