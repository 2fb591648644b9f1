//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - The octocrab interpreter in `crate::github`
//! - Recording mock interpreters for tests

use std::future::Future;

use super::github::{ActionsEffect, ActionsResponse};

/// Interprets Actions effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CancelEverything;
///
/// impl ActionsInterpreter for CancelEverything {
///     type Error = GitHubApiError;
///
///     async fn interpret(&self, effect: ActionsEffect) -> Result<ActionsResponse, Self::Error> {
///         match effect {
///             ActionsEffect::CancelWorkflowRun { .. } => Ok(ActionsResponse::CancelRequested),
///             other => Err(GitHubApiError::permanent_without_source(other.name())),
///         }
///     }
/// }
/// ```
pub trait ActionsInterpreter: Sync {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute an Actions effect and return its response.
    fn interpret(
        &self,
        effect: ActionsEffect,
    ) -> impl Future<Output = Result<ActionsResponse, Self::Error>> + Send;
}
