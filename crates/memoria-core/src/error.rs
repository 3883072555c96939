//! Top-level error type for the memory core.
//!
//! Every subsystem error converts into [`CoreError`] at the orchestrator
//! boundary. Callers match on the kind, not on subsystem internals.

use crate::lifecycle::ValidationOutcome;
use crate::store::StoreError;

/// Errors surfaced by the public orchestrator API: invalid input, unknown
/// reference, validation rejection, store unavailable/corruption, manifest
/// generation failure, and internal invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A malformed or out-of-range argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An id referenced by the caller does not exist in the state.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// A write-time validation rule rejected the candidate.
    #[error("validation rejected write (confidence {:.2})", outcome.confidence)]
    ValidationRejected {
        /// The full validator result, including adjusted importance and signals.
        outcome: ValidationOutcome,
    },

    /// The persistent store could not be reached or is otherwise unavailable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A manifest-related operation failed (rendering, community detection).
    #[error("manifest error: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),

    /// A condition the implementation asserts can never occur. Fatal.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate's public surface.
pub type Result<T> = std::result::Result<T, CoreError>;
