//! Embedding model trait and types.
//!
//! Defines the interface for generating fingerprints from text.

use crate::error::EmbeddingError;

/// Fixed-length float vector describing a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub values: Vec<f32>,
}

impl Fingerprint {
    /// Create a fingerprint from raw values, normalizing to unit length.
    /// A zero vector is kept as-is.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let normalized = if norm > 0.0 && norm.is_finite() {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values: normalized }
    }

    /// Create a fingerprint without normalization (for pre-normalized vectors)
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// True when no element is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Inner product with another fingerprint.
    /// Equals cosine similarity when both are unit-normalized.
    pub fn dot(&self, other: &Fingerprint) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

impl From<Vec<f32>> for Fingerprint {
    fn from(values: Vec<f32>) -> Self {
        Self::from_normalized(values)
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "feature-hashing")
    pub name: String,
    /// Output dimension
    pub dimension: usize,
}

/// Trait for embedding models.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
/// Output should be unit-normalized so that inner product equals cosine
/// similarity in the flat index.
pub trait Embedder: Send + Sync {
    fn info(&self) -> &ModelInfo;

    fn dimension(&self) -> usize {
        self.info().dimension
    }

    /// Generate a fingerprint for a single text.
    fn embed(&self, text: &str) -> Result<Fingerprint, EmbeddingError>;
}
