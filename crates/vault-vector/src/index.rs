//! Vector index trait and types.
//!
//! Defines the interface shared by every backend.

use serde::Serialize;
use vault_embeddings::Fingerprint;

use crate::error::IndexError;

/// How to read [`SimilarityResult::score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Inner product, higher = more similar
    Similarity,
    /// Distance, lower = more similar
    Distance,
}

/// Result of a vector search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Record id the vector was stored under
    pub id: String,
    /// Score on the backend's [`ScoreKind`] scale
    pub score: f32,
}

impl SimilarityResult {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub total_vectors: usize,
    /// Fingerprint dimension
    pub dimension: usize,
    /// Adds not yet covered by a durable snapshot
    pub pending_unsaved_count: usize,
}

/// Trait for vector indexes.
///
/// Every method takes `&self`; implementations synchronize internally so one
/// instance can be shared across threads behind an `Arc`.
pub trait VectorIndex: Send + Sync {
    /// Short backend name for logs and health reports
    fn backend(&self) -> &'static str;

    /// Scale used by [`SimilarityResult::score`]
    fn score_kind(&self) -> ScoreKind;

    /// Store `vector` under `id`.
    fn add(&self, id: &str, vector: &Fingerprint) -> Result<(), IndexError>;

    /// Return up to `k` nearest entries, best first.
    /// An empty index yields an empty vec, not an error.
    fn search(&self, query: &Fingerprint, k: usize) -> Result<Vec<SimilarityResult>, IndexError>;

    /// Force a durable snapshot.
    fn save(&self) -> Result<(), IndexError>;

    fn stats(&self) -> Result<IndexStats, IndexError>;
}
