//! Error types for junction-tree construction.

use thiserror::Error;

/// Errors that can occur while building a junction tree.
///
/// Marked `#[non_exhaustive]` so new variants can be added without a
/// breaking change.
///
/// Both variants are fatal: construction never retries and never returns a
/// partially built tree.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The input violated a documented precondition.
    ///
    /// Raised for malformed elimination trees, such as a factor attached to
    /// a node whose key it does not involve, and for invalid noise-model
    /// parameters.
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),

    /// Internal invariant failure.
    ///
    /// Indicates a bug in the traversal driver or visitor pairing, such as
    /// a clique whose child count diverged from its recorded child
    /// conditionals.
    #[error("internal error: {0}")]
    Internal(String),
}
