//! Shared embedder handle.
//!
//! Wraps one model instance so every workflow can hold a cheap clone while
//! calls into the model are serialized behind the handle's own mutex.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::EmbeddingError;
use crate::model::{Embedder, Fingerprint, ModelInfo};

/// Reference-counted embedder with an internal lock around model calls.
#[derive(Clone)]
pub struct SharedEmbedder {
    model: Arc<Mutex<Box<dyn Embedder>>>,
    info: ModelInfo,
}

impl SharedEmbedder {
    pub fn new(model: impl Embedder + 'static) -> Self {
        let info = model.info().clone();
        Self {
            model: Arc::new(Mutex::new(Box::new(model))),
            info,
        }
    }
}

impl Embedder for SharedEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Fingerprint, EmbeddingError> {
        let fingerprint = self.model.lock().embed(text)?;
        if fingerprint.dimension() != self.info.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.info.dimension,
                actual: fingerprint.dimension(),
            });
        }
        Ok(fingerprint)
    }
}
