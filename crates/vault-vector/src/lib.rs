//! # vault-vector
//!
//! Nearest-neighbor index for prompt-vault.
//!
//! Two interchangeable backends implement [`VectorIndex`]:
//! - [`FlatIndex`]: exact brute-force inner product search over an in-memory
//!   table, persisted as a pair of snapshot files written atomically
//! - [`ManagedStoreIndex`]: delegates to an external vector store over HTTP
//!
//! The backends report scores on different scales (see [`ScoreKind`]), so a
//! deployment picks one via configuration and sticks with it.

pub mod backend;
pub mod error;
pub mod flat;
pub mod index;
pub mod managed;
pub mod snapshot;

pub use backend::open_index;
pub use error::IndexError;
pub use flat::{FlatConfig, FlatIndex};
pub use index::{IndexStats, ScoreKind, SimilarityResult, VectorIndex};
pub use managed::{CollectionClient, HttpCollectionClient, ManagedConfig, ManagedStoreIndex};
pub use snapshot::SnapshotPaths;
