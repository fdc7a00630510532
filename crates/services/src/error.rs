//! Shared error types for the services crate.

use thiserror::Error;

use client::ApiError;

/// Errors emitted by the attempt flow.
///
/// Guarded mutators never error; only remote interactions do. The variant
/// names the operation so callers can pick the right recovery: a failed
/// load is fatal to the session, a failed submit or explicit save is
/// surfaced and retryable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("failed to load attempt")]
    Load(#[source] ApiError),

    #[error("failed to save progress")]
    Save(#[source] ApiError),

    #[error("failed to submit attempt")]
    Submit(#[source] ApiError),
}
