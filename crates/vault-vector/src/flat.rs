//! Exact in-process vector index.
//!
//! Vectors live in one contiguous row-major table next to a parallel id
//! list; a search scores every row by inner product. The table is the source
//! of truth at runtime and snapshots on disk are derived from it.
//!
//! Snapshot policy: every add bumps a pending counter. Once the counter
//! reaches `autosave_batch`, or `autosave_interval` has elapsed since the
//! last snapshot, the add writes one. Both conditions are checked under the
//! same lock as the mutation.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use vault_embeddings::Fingerprint;

use crate::error::IndexError;
use crate::index::{IndexStats, ScoreKind, SimilarityResult, VectorIndex};
use crate::snapshot::{read_snapshot, write_snapshot, SnapshotPaths};

/// Flat index configuration
#[derive(Debug, Clone)]
pub struct FlatConfig {
    /// Fingerprint dimension
    pub dimension: usize,
    /// Snapshot file locations
    pub paths: SnapshotPaths,
    /// Snapshot after this many unsaved adds
    pub autosave_batch: usize,
    /// Snapshot once this much time passed since the last one
    pub autosave_interval: Option<Duration>,
}

impl FlatConfig {
    /// Ids file defaults to `<index_path>.ids.json`.
    pub fn new(dimension: usize, index_path: impl Into<PathBuf>) -> Self {
        let vectors: PathBuf = index_path.into();
        let ids = PathBuf::from(format!("{}.ids.json", vectors.display()));
        Self {
            dimension,
            paths: SnapshotPaths::new(vectors, ids),
            autosave_batch: 10,
            autosave_interval: None,
        }
    }

    pub fn with_ids_path(mut self, ids_path: impl Into<PathBuf>) -> Self {
        self.paths.ids = ids_path.into();
        self
    }

    pub fn with_autosave_batch(mut self, batch: usize) -> Self {
        self.autosave_batch = batch.max(1);
        self
    }

    pub fn with_autosave_interval(mut self, interval: Option<Duration>) -> Self {
        self.autosave_interval = interval;
        self
    }
}

struct FlatState {
    /// Row-major, `ids.len() * dimension` values
    vectors: Vec<f32>,
    ids: Vec<String>,
    known: HashSet<String>,
    pending: usize,
    last_snapshot: Instant,
}

impl FlatState {
    fn empty() -> Self {
        Self {
            vectors: Vec::new(),
            ids: Vec::new(),
            known: HashSet::new(),
            pending: 0,
            last_snapshot: Instant::now(),
        }
    }
}

/// Exact brute-force index persisted to a pair of snapshot files.
pub struct FlatIndex {
    state: Mutex<FlatState>,
    config: FlatConfig,
}

impl FlatIndex {
    /// Open the index, loading an existing snapshot when one is usable.
    ///
    /// A missing, unreadable, or inconsistent snapshot yields an empty index
    /// rather than an error.
    pub fn open(config: FlatConfig) -> Self {
        let state = match read_snapshot(&config.paths, config.dimension) {
            Ok(Some(snapshot)) => {
                let known: HashSet<String> = snapshot.ids.iter().cloned().collect();
                if known.len() != snapshot.ids.len() {
                    warn!(path = ?config.paths.ids, "Snapshot has duplicate ids, starting empty");
                    FlatState::empty()
                } else {
                    info!(
                        path = ?config.paths.vectors,
                        vectors = snapshot.ids.len(),
                        "Loaded vector snapshot"
                    );
                    FlatState {
                        vectors: snapshot.vectors,
                        ids: snapshot.ids,
                        known,
                        pending: 0,
                        last_snapshot: Instant::now(),
                    }
                }
            }
            Ok(None) => {
                info!(path = ?config.paths.vectors, dim = config.dimension, "Creating new vector index");
                FlatState::empty()
            }
            Err(e) => {
                warn!(error = %e, path = ?config.paths.vectors, "Unusable snapshot, starting empty");
                FlatState::empty()
            }
        };

        Self {
            state: Mutex::new(state),
            config,
        }
    }

    pub fn config(&self) -> &FlatConfig {
        &self.config
    }

    fn validate(&self, vector: &Fingerprint) -> Result<(), IndexError> {
        if vector.dimension() != self.config.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.dimension(),
            });
        }
        if vector.is_empty() {
            return Err(IndexError::InvalidVector("vector is empty".to_string()));
        }
        if !vector.is_finite() {
            return Err(IndexError::InvalidVector(
                "vector contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }

    fn snapshot_due(&self, state: &FlatState) -> bool {
        if state.pending == 0 {
            return false;
        }
        if state.pending >= self.config.autosave_batch {
            return true;
        }
        self.config
            .autosave_interval
            .is_some_and(|interval| state.last_snapshot.elapsed() >= interval)
    }

    /// Caller must hold the state lock for the whole write.
    fn write_locked(&self, state: &mut FlatState) -> Result<(), IndexError> {
        write_snapshot(
            &self.config.paths,
            self.config.dimension,
            &state.vectors,
            &state.ids,
        )?;
        state.pending = 0;
        state.last_snapshot = Instant::now();
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn backend(&self) -> &'static str {
        "flat"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Similarity
    }

    fn add(&self, id: &str, vector: &Fingerprint) -> Result<(), IndexError> {
        self.validate(vector)?;

        let mut state = self.state.lock();
        if state.known.contains(id) {
            return Err(IndexError::DuplicateId(id.to_string()));
        }

        state.vectors.extend_from_slice(vector.as_slice());
        state.ids.push(id.to_string());
        state.known.insert(id.to_string());
        state.pending += 1;
        debug!(id = id, total = state.ids.len(), "Added vector");

        if self.snapshot_due(&state) {
            // Best effort: the add already succeeded in memory. A failed write
            // leaves `pending` as is, so the next add tries again.
            if let Err(e) = self.write_locked(&mut state) {
                warn!(error = %e, pending = state.pending, "Auto-save failed");
            }
        }
        Ok(())
    }

    fn search(&self, query: &Fingerprint, k: usize) -> Result<Vec<SimilarityResult>, IndexError> {
        self.validate(query)?;

        let state = self.state.lock();
        if state.ids.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let q = query.as_slice();
        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .chunks_exact(self.config.dimension)
            .map(|row| row.iter().zip(q).map(|(a, b)| a * b).sum::<f32>())
            .enumerate()
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        let results: Vec<SimilarityResult> = scored
            .into_iter()
            .map(|(pos, score)| SimilarityResult::new(state.ids[pos].clone(), score))
            .collect();

        debug!(k = k, found = results.len(), "Search complete");
        Ok(results)
    }

    fn save(&self) -> Result<(), IndexError> {
        let mut state = self.state.lock();
        self.write_locked(&mut state)?;
        info!(path = ?self.config.paths.vectors, vectors = state.ids.len(), "Saved vector index");
        Ok(())
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        let state = self.state.lock();
        Ok(IndexStats {
            total_vectors: state.ids.len(),
            dimension: self.config.dimension,
            pending_unsaved_count: state.pending,
        })
    }
}
