//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Input text cannot be embedded (empty, whitespace only, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model produced no usable values
    #[error("Model produced an empty embedding")]
    EmptyEmbedding,

    /// Underlying model failure
    #[error("Model error: {0}")]
    Model(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
