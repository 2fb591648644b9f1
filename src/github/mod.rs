//! GitHub API client and Actions effect interpreter.
//!
//! Executes [`crate::effects::ActionsEffect`]s via octocrab. Key features:
//! - Exponential backoff retry for transient failures on reads
//! - Distinguishes transient vs permanent errors
//! - Cancellation requests are sent exactly once per effect

mod client;
mod error;
mod interpreter;
mod retry;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_actions_effect;
pub use retry::{RetryConfig, RetryPolicy};
