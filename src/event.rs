//! Trigger context of the current workflow run.
//!
//! The runner describes the triggering event through `GITHUB_*` variables and
//! a JSON payload at `GITHUB_EVENT_PATH`. Only the fields the pass needs are
//! extracted; the raw pull request object is kept for the diagnostic dump.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{PrNumber, RepoId, RunId, Sha};

/// Error reading the trigger context.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read event payload {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed event payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// The pull request that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: PrNumber,
    pub head_sha: Sha,
}

/// Ambient context of the invocation.
#[derive(Debug, Clone)]
pub struct TriggerContext {
    pub event_name: String,
    pub repo: RepoId,
    /// The run executing this pass; never a cancellation candidate.
    pub run_id: RunId,
    /// Present when the payload carries a `pull_request` object.
    pub pull_request: Option<PullRequestRef>,
    /// The raw `pull_request` payload object, for diagnostics.
    pub pull_request_payload: Option<serde_json::Value>,
}

impl TriggerContext {
    /// Reads the context from the process environment and the payload file.
    pub fn from_env() -> Result<Self, EventError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EventError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let event_name = require("GITHUB_EVENT_NAME")?;
        let raw_repo = require("GITHUB_REPOSITORY")?;
        let repo = RepoId::parse(&raw_repo).ok_or_else(|| ConfigError::Invalid {
            name: "GITHUB_REPOSITORY",
            value: raw_repo.clone(),
            reason: "expected owner/repo",
        })?;
        let raw_run_id = require("GITHUB_RUN_ID")?;
        let run_id = raw_run_id
            .parse::<u64>()
            .map(RunId)
            .map_err(|_| ConfigError::Invalid {
                name: "GITHUB_RUN_ID",
                value: raw_run_id.clone(),
                reason: "expected a numeric run id",
            })?;
        let event_path = require("GITHUB_EVENT_PATH")?;

        let payload = read_payload(Path::new(&event_path))?;
        let (pull_request, pull_request_payload) = parse_pull_request(&payload)?;

        Ok(TriggerContext {
            event_name,
            repo,
            run_id,
            pull_request,
            pull_request_payload,
        })
    }
}

fn read_payload(path: &Path) -> Result<Vec<u8>, EventError> {
    std::fs::read(path).map_err(|source| EventError::Read {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    head: RawHead,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

/// Extracts the pull request from an event payload.
///
/// Returns `(None, None)` for payloads without a `pull_request` object (push,
/// schedule, ...). A `pull_request` object missing its number or head SHA is
/// malformed.
pub fn parse_pull_request(
    payload: &[u8],
) -> Result<(Option<PullRequestRef>, Option<serde_json::Value>), EventError> {
    let raw: RawPayload = serde_json::from_slice(payload)?;
    let Some(value) = raw.pull_request.filter(|v| !v.is_null()) else {
        return Ok((None, None));
    };

    let pr: RawPullRequest = serde_json::from_value(value.clone())?;
    Ok((
        Some(PullRequestRef {
            number: PrNumber(pr.number),
            head_sha: Sha(pr.head.sha),
        }),
        Some(value),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn pr_payload() -> serde_json::Value {
        serde_json::json!({
            "action": "synchronize",
            "number": 17,
            "pull_request": {
                "number": 17,
                "title": "Speed up the frobnicator",
                "body": "long description",
                "head": { "sha": "abc123", "ref": "feature", "repo": { "full_name": "octo/widgets" } },
                "base": { "sha": "def456", "ref": "main" },
                "user": { "login": "octocat" }
            },
            "repository": { "full_name": "octo/widgets" }
        })
    }

    #[test]
    fn pull_request_extracted() {
        let bytes = serde_json::to_vec(&pr_payload()).unwrap();
        let (pr, raw) = parse_pull_request(&bytes).unwrap();
        let pr = pr.unwrap();
        assert_eq!(pr.number, PrNumber(17));
        assert_eq!(pr.head_sha, Sha::new("abc123"));
        assert_eq!(raw.unwrap()["title"], "Speed up the frobnicator");
    }

    #[test]
    fn non_pull_request_payload_yields_none() {
        let push = serde_json::json!({ "ref": "refs/heads/main", "after": "abc123" });
        let (pr, raw) = parse_pull_request(&serde_json::to_vec(&push).unwrap()).unwrap();
        assert!(pr.is_none());
        assert!(raw.is_none());

        let null_pr = br#"{ "pull_request": null }"#;
        assert!(parse_pull_request(null_pr).unwrap().0.is_none());
    }

    #[test]
    fn pull_request_without_head_is_malformed() {
        let payload = br#"{ "pull_request": { "number": 3 } }"#;
        assert!(matches!(
            parse_pull_request(payload),
            Err(EventError::Json(_))
        ));
    }

    #[test]
    fn context_read_from_environment_and_payload_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&serde_json::to_vec(&pr_payload()).unwrap())
            .unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            ("GITHUB_EVENT_NAME", "pull_request".to_string()),
            ("GITHUB_REPOSITORY", "octo/widgets".to_string()),
            ("GITHUB_RUN_ID", "987654".to_string()),
            ("GITHUB_EVENT_PATH", file.path().display().to_string()),
        ]);

        let ctx = TriggerContext::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(ctx.event_name, "pull_request");
        assert_eq!(ctx.repo, RepoId::new("octo", "widgets"));
        assert_eq!(ctx.run_id, RunId(987654));
        assert_eq!(ctx.pull_request.unwrap().number, PrNumber(17));
    }

    #[test]
    fn bad_run_id_is_rejected() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REPOSITORY", "octo/widgets"),
            ("GITHUB_RUN_ID", "not-a-number"),
            ("GITHUB_EVENT_PATH", "/nonexistent"),
        ]);

        let err = TriggerContext::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(
            err,
            EventError::Config(ConfigError::Invalid {
                name: "GITHUB_RUN_ID",
                ..
            })
        ));
    }

    #[test]
    fn missing_payload_file_is_a_read_error() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REPOSITORY", "octo/widgets"),
            ("GITHUB_RUN_ID", "1"),
            ("GITHUB_EVENT_PATH", "/definitely/not/here.json"),
        ]);

        let err = TriggerContext::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, EventError::Read { .. }));
    }
}
