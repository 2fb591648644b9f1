//! Action inputs and tunables.
//!
//! GitHub Actions passes `with:` inputs as `INPUT_<NAME>` environment
//! variables (name upper-cased). Everything is read once at start-up through a
//! lookup function, so tests can supply a map instead of touching the process
//! environment.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::types::{LiveStatuses, PULL_REQUEST_EVENT, RunStatus};

/// Check suites owned by any other app are never touched.
pub const DEFAULT_APP_SLUG: &str = "github-actions";

const DEFAULT_MAX_CANCEL_ATTEMPTS: u32 = 10;
const DEFAULT_CANCEL_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_RESOLVE_ATTEMPTS: u32 = 2;
const DEFAULT_EMPTY_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_CREATION_GRACE_SECS: u64 = 10;

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required input or variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Check-suite resolution tunables.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Total number of list queries, including the first.
    pub max_attempts: u32,

    /// Wait before re-querying when no suites were returned.
    pub empty_retry_delay: Duration,

    /// How long after the newest suite's creation sibling suites are assumed
    /// to have materialized.
    pub creation_grace: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_attempts: DEFAULT_RESOLVE_ATTEMPTS,
            empty_retry_delay: Duration::from_secs(DEFAULT_EMPTY_RETRY_DELAY_SECS),
            creation_grace: Duration::from_secs(DEFAULT_CREATION_GRACE_SECS),
        }
    }
}

/// Run reconciliation and cancellation tunables.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Slug of the app whose check suites are eligible.
    pub app_slug: String,

    /// Triggering event the listed runs are restricted to.
    pub event: String,

    /// Statuses a run must have to be cancelled.
    pub live: LiveStatuses,

    /// One status-filtered listing query is issued per entry.
    pub query_statuses: Vec<RunStatus>,

    /// Normal cancellation requests allowed per run before escalating.
    pub max_cancel_attempts: u32,

    /// Wait between cancellation attempts on the same run.
    pub retry_delay: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        let live = LiveStatuses::default();
        ReconcileConfig {
            app_slug: DEFAULT_APP_SLUG.to_string(),
            event: PULL_REQUEST_EVENT.to_string(),
            query_statuses: live.sorted(),
            live,
            max_cancel_attempts: DEFAULT_MAX_CANCEL_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_CANCEL_RETRY_DELAY_SECS),
        }
    }
}

/// Full configuration for one invocation.
#[derive(Clone)]
pub struct Config {
    pub github_token: String,

    /// Suppress every mutating request while still counting it.
    pub dry_run: bool,

    /// API base URL override (`GITHUB_API_URL`), for GitHub Enterprise Server.
    pub api_base: Option<String>,

    pub resolver: ResolverConfig,
    pub reconcile: ReconcileConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &"<redacted>")
            .field("dry_run", &self.dry_run)
            .field("api_base", &self.api_base)
            .field("resolver", &self.resolver)
            .field("reconcile", &self.reconcile)
            .finish()
    }
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let github_token = get("INPUT_GITHUBTOKEN").ok_or(ConfigError::Missing("githubToken"))?;
        let dry_run = get("INPUT_DRYRUN").is_some_and(|v| parse_flag(&v));

        let mut reconcile = ReconcileConfig::default();
        if let Some(slug) = get("INPUT_APPSLUG") {
            reconcile.app_slug = slug.trim().to_string();
        }
        if let Some(raw) = get("INPUT_MAXCANCELATTEMPTS") {
            reconcile.max_cancel_attempts = parse_number("maxCancelAttempts", &raw)?;
            if reconcile.max_cancel_attempts == 0 {
                return Err(ConfigError::Invalid {
                    name: "maxCancelAttempts",
                    value: raw,
                    reason: "must be at least 1",
                });
            }
        }
        if let Some(raw) = get("INPUT_RETRYDELAYSECONDS") {
            reconcile.retry_delay = Duration::from_secs(parse_number("retryDelaySeconds", &raw)?);
        }

        Ok(Config {
            github_token,
            dry_run,
            api_base: get("GITHUB_API_URL"),
            resolver: ResolverConfig::default(),
            reconcile,
        })
    }
}

/// Action inputs are strings; only a case-insensitive `true` enables a flag.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: "expected a non-negative integer",
    })
}
