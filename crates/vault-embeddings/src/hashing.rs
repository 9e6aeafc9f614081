//! Offline feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with SHA-256 into one of `D`
//! buckets with a hash-derived sign, and the summed vector is normalized.
//! Texts sharing vocabulary land close together; identical texts produce
//! identical fingerprints.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{Embedder, Fingerprint, ModelInfo};

/// Deterministic embedder that needs no model files.
pub struct HashingEmbedder {
    info: ModelInfo,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "feature-hashing".to_string(),
                dimension,
            },
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(word) % self.info.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

impl Embedder for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Fingerprint, EmbeddingError> {
        if self.info.dimension == 0 {
            return Err(EmbeddingError::Model("dimension must be > 0".to_string()));
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut values = vec![0.0f32; self.info.dimension];
        let mut tokens = 0usize;
        for token in tokenize(text) {
            let (index, sign) = self.bucket(&token);
            values[index] += sign;
            tokens += 1;
        }

        if values.iter().all(|v| *v == 0.0) {
            return Err(EmbeddingError::EmptyEmbedding);
        }

        debug!(tokens, dim = self.info.dimension, "Embedded text");
        Ok(Fingerprint::new(values))
    }
}
