use serde::{Deserialize, Serialize};

use super::ids::RunId;
use super::status::RunStatus;

/// The triggering event name of workflow runs started by pull request updates.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// The conclusion GitHub reports for a run that was cancelled.
pub const CANCELLED_CONCLUSION: &str = "cancelled";

/// A single execution of a workflow.
///
/// Status moves outside this crate's control; the only mutation we ever
/// request is cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    pub name: Option<String>,
    pub url: String,
    pub status: Option<RunStatus>,
    pub conclusion: Option<String>,
    /// Triggering event name, e.g. `pull_request` or `push`.
    pub event: String,
}
