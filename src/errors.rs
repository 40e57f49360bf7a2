//! Error types shared across the engine.
//!
//! Solver-internal errors never escape the orchestrator: they are caught,
//! reported on the event stream and the portfolio moves on. The variants
//! here are the ones callers can actually observe at the API boundary.

use thiserror::Error;

/// Errors produced by the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The input contained no usable characters.
    #[error("input is empty")]
    EmptyInput,

    /// The cleaned input is below the minimum length for classification.
    #[error("text too short for classification ({0} letters, need 20)")]
    InputTooShort(usize),

    /// Layout re-application ran out of plaintext letters.
    #[error("cleaned plaintext has fewer letters than the original layout demands")]
    LengthMismatch,

    /// A language model or dictionary file could not be loaded.
    #[error("missing resource: {0}")]
    ResourceMissing(String),

    /// The time budget was exceeded.
    #[error("time budget exceeded")]
    Timeout,

    /// A solver was handed a structurally invalid key.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
