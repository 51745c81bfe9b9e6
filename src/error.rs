//! Error types for lineage operations

use thiserror::Error;

/// Errors that can occur while stamping or assembling
#[derive(Debug, Error)]
pub enum LineageError {
    /// Caller supplied a bad model or seed. Detected before any timestamp
    /// is generated; recoverable by correcting the call.
    #[error("Invalid provenance input: {0}")]
    InvalidProvenance(String),

    /// A fully-constructed node is missing part of its provenance block.
    /// Signals a contract violation (a node built outside the stamper),
    /// never a transient condition.
    #[error("Incomplete provenance at node {index}: missing {field}")]
    IncompleteProvenance { index: usize, field: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for lineage operations
pub type LineageResult<T> = Result<T, LineageError>;
