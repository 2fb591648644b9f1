//! Cancel Superseded - A GitHub Action that cancels workflow runs made obsolete by a newer push.
//!
//! This library resolves the check suites of a pull request's head commit and
//! drives every other live `pull_request` workflow run on them to cancellation.

pub mod config;
pub mod effects;
pub mod engine;
pub mod event;
pub mod github;
pub mod output;
pub mod pass;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod test_utils;
