//! Error types for the saga orchestrator core.
//!
//! All fallible operations in this crate return [`SagaError`]. Variants map onto the
//! error taxonomy described for the orchestrator: malformed commands are rejected at
//! ingest, dispatch/validation failures become step failures, and correlation misses
//! are handled by the caller (they are not represented as errors — see the correlator).

use uuid::Uuid;

/// Primary error type for saga ingestion, dispatch, and execution.
#[derive(Debug, thiserror::Error)]
pub enum SagaError {
    /// A saga command was submitted with an empty step list.
    #[error("saga command has no steps")]
    EmptySteps,

    /// A step's payload did not match the shape its action requires.
    #[error("payload for action {action} is invalid: {message}")]
    InvalidPayload { action: String, message: String },

    /// A `validate_character_state` condition of type `item` was missing `item_id`.
    #[error("condition of type 'item' requires item_id")]
    MissingItemId,

    /// No saga exists for the given transaction id.
    #[error("saga not found: {0}")]
    SagaNotFound(Uuid),

    /// Emitting outbound messages for a step failed.
    #[error("dispatch failed: {message}")]
    DispatchFailed { message: String },

    /// The synchronous validation call failed (transport, non-2xx, or malformed body).
    #[error("validation call failed: {message}")]
    ValidationCallFailed { message: String },

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SagaResult<T> = Result<T, SagaError>;
