//! Service error taxonomy.

use thiserror::Error;
use vault_embeddings::EmbeddingError;
use vault_storage::StorageError;
use vault_vector::IndexError;

use crate::responder::ResponseError;

/// Failure of a workflow, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[source] EmbeddingError),

    #[error("Response generation failed: {0}")]
    ResponseGeneration(#[source] ResponseError),

    #[error("Repository error: {0}")]
    Repository(#[source] StorageError),

    #[error("Index error: {0}")]
    Index(#[source] IndexError),
}

impl ServiceError {
    /// True when the caller sent bad input; everything else is a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_only_validation_is_client_error() {
        assert!(ServiceError::Validation("empty".into()).is_client_error());
        assert!(!ServiceError::Index(IndexError::BackendFailure("down".into())).is_client_error());
        assert!(!ServiceError::Embedding(EmbeddingError::EmptyEmbedding).is_client_error());
    }

    #[test]
    fn test_cause_is_preserved() {
        let err = ServiceError::Index(IndexError::DimensionMismatch {
            expected: 384,
            actual: 3,
        });
        let source = err.source().expect("source");
        assert!(source.to_string().contains("384"));
    }
}
