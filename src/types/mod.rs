//! Core domain types for superseded-run cancellation.
//!
//! Identifiers, status values, and the read-only platform models the resolver
//! and engine operate on.

pub mod check_suite;
pub mod ids;
pub mod status;
pub mod workflow_run;

pub use check_suite::CheckSuite;
pub use ids::{CheckSuiteId, PrNumber, RepoId, RunId, Sha};
pub use status::{LiveStatuses, RunStatus};
pub use workflow_run::{CANCELLED_CONCLUSION, PULL_REQUEST_EVENT, WorkflowRun};
