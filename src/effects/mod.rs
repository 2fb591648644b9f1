//! Effects-as-data for GitHub Actions operations.
//!
//! The resolver and engine describe every platform call as an [`ActionsEffect`]
//! and hand it to an [`ActionsInterpreter`]. This keeps the reconciliation logic
//! independent of the transport and lets tests substitute a recording mock.

pub mod github;
pub mod interpreter;

pub use github::{ActionsEffect, ActionsResponse};
pub use interpreter::ActionsInterpreter;
