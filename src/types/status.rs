//! Run and check-suite status values.
//!
//! GitHub reports check suite and workflow run status as the same family of
//! strings. Unknown values are preserved rather than rejected so that a new
//! platform status never breaks a pass; it is simply treated as not live.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a check suite or workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    ActionRequired,
    Stale,
    Requested,
    Waiting,
    Pending,
    Completed,
    /// A status string this crate does not know about.
    Other(String),
}

impl RunStatus {
    /// The statuses that mean work has not finished yet.
    pub const LIVE: [RunStatus; 7] = [
        RunStatus::ActionRequired,
        RunStatus::Stale,
        RunStatus::InProgress,
        RunStatus::Queued,
        RunStatus::Requested,
        RunStatus::Waiting,
        RunStatus::Pending,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "action_required" => RunStatus::ActionRequired,
            "stale" => RunStatus::Stale,
            "requested" => RunStatus::Requested,
            "waiting" => RunStatus::Waiting,
            "pending" => RunStatus::Pending,
            "completed" => RunStatus::Completed,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// Returns the GitHub API string for this status.
    pub fn as_api_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::ActionRequired => "action_required",
            RunStatus::Stale => "stale",
            RunStatus::Requested => "requested",
            RunStatus::Waiting => "waiting",
            RunStatus::Pending => "pending",
            RunStatus::Completed => "completed",
            RunStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        RunStatus::parse(&s)
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_api_str().to_string()
    }
}

/// The configured set of statuses considered "live" (cancellable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStatuses(HashSet<RunStatus>);

impl LiveStatuses {
    pub fn new(statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        LiveStatuses(statuses.into_iter().collect())
    }

    pub fn contains(&self, status: &RunStatus) -> bool {
        self.0.contains(status)
    }

    /// Returns true if `status` is present and live. An absent status is never live.
    pub fn is_live(&self, status: Option<&RunStatus>) -> bool {
        status.is_some_and(|s| self.contains(s))
    }

    /// Iterates the set in a stable order, so status-filtered queries are issued
    /// deterministically.
    pub fn sorted(&self) -> Vec<RunStatus> {
        let mut statuses: Vec<_> = self.0.iter().cloned().collect();
        statuses.sort_by(|a, b| a.as_api_str().cmp(b.as_api_str()));
        statuses
    }
}

impl Default for LiveStatuses {
    fn default() -> Self {
        LiveStatuses::new(RunStatus::LIVE)
    }
}
