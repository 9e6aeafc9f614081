//! # vault-embeddings
//!
//! Embedding port for prompt-vault.
//!
//! Text is turned into a fixed-dimension [`Fingerprint`] by an [`Embedder`].
//! The vector index treats fingerprints as opaque float vectors, so any model
//! producing unit-normalized output of the configured dimension can be
//! plugged in.
//!
//! ## Provided embedders
//! - [`HashingEmbedder`]: deterministic, offline token feature hashing
//! - [`SharedEmbedder`]: reference-counted handle that serializes calls into
//!   an underlying model behind its own lock

pub mod error;
pub mod hashing;
pub mod model;
pub mod shared;

pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use model::{Embedder, Fingerprint, ModelInfo};
pub use shared::SharedEmbedder;
