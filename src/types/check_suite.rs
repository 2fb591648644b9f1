use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CheckSuiteId, PrNumber, Sha};
use super::status::RunStatus;

/// A check suite: the platform's grouping of runs for one commit and one app.
///
/// Created asynchronously after a push. Only ever read by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSuite {
    pub id: CheckSuiteId,

    /// Slug of the app that owns the suite (`github-actions` for Actions).
    pub app_slug: Option<String>,

    /// The commit the suite was created for.
    pub head_sha: Sha,

    /// Aggregate status. Absent on some suites that were never requested.
    pub status: Option<RunStatus>,

    pub created_at: DateTime<Utc>,

    /// Pull requests the platform associated with this suite.
    ///
    /// Empty for pull requests from forks, so this is informational only.
    pub pull_requests: Vec<PrNumber>,
}
