//! Component wiring and lifecycle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use vault_embeddings::{Embedder, HashingEmbedder, SharedEmbedder};
use vault_storage::{RecordStore, Storage};
use vault_types::Settings;
use vault_vector::{open_index, IndexError, IndexStats, VectorIndex};

use crate::ingest::IngestWorkflow;
use crate::rate_limit::RateLimiter;
use crate::responder::{self, ResponseGenerator};
use crate::search::SearchWorkflow;
use crate::validate::InputValidator;

/// Error raised while assembling a [`VaultContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Record store: {0}")]
    Storage(#[from] vault_storage::StorageError),

    #[error("Vector index: {0}")]
    Index(#[from] IndexError),

    #[error("Responder: {0}")]
    Responder(#[from] responder::ResponseError),
}

/// Health of one component.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentHealth<T> {
    Healthy(T),
    Unhealthy { error: String },
}

impl<T> ComponentHealth<T> {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ComponentHealth::Healthy(_))
    }

    fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ComponentHealth::Healthy(value),
            Err(e) => ComponentHealth::Unhealthy {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexHealth {
    pub backend: &'static str,
    pub total_vectors: usize,
    pub dimension: usize,
    pub pending_unsaved_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedderHealth {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordStoreHealth {
    pub records: usize,
}

/// Snapshot of every component's state.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub vector_index: ComponentHealth<IndexHealth>,
    pub embedder: ComponentHealth<EmbedderHealth>,
    pub record_store: ComponentHealth<RecordStoreHealth>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.vector_index.is_healthy() && self.embedder.is_healthy() && self.record_store.is_healthy()
    }
}

/// Every component, built once per process.
///
/// The index is the sole owner of its snapshot files; build one context per
/// process and call [`VaultContext::shutdown`] before exit. Construction and
/// shutdown may block on disk or network I/O.
pub struct VaultContext {
    settings: Settings,
    records: Arc<dyn RecordStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    rate_limiter: Arc<RateLimiter>,
    ingest: IngestWorkflow,
    search: SearchWorkflow,
}

impl VaultContext {
    /// Open the RocksDB record store at `settings.db_path` and build the rest.
    pub fn from_settings(settings: &Settings) -> Result<Self, ContextError> {
        let records: Arc<dyn RecordStore> = Arc::new(Storage::open(Path::new(&settings.db_path))?);
        Self::with_record_store(settings, records)
    }

    /// Build around an existing record store.
    pub fn with_record_store(
        settings: &Settings,
        records: Arc<dyn RecordStore>,
    ) -> Result<Self, ContextError> {
        let index = open_index(settings)?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(SharedEmbedder::new(HashingEmbedder::new(settings.embedding_dim)));
        let responder: Arc<dyn ResponseGenerator> = responder::from_settings(&settings.responder)?;
        let validator = InputValidator::new(settings.limits.max_prompt_length);

        let ingest = IngestWorkflow::new(
            Arc::clone(&responder),
            Arc::clone(&records),
            Arc::clone(&index),
            Arc::clone(&embedder),
            validator,
        );
        let search = SearchWorkflow::new(
            Arc::clone(&index),
            Arc::clone(&embedder),
            Arc::clone(&records),
            validator,
            settings.limits.max_results,
        );

        info!(
            backend = index.backend(),
            dimension = settings.embedding_dim,
            "Vault context ready"
        );

        Ok(Self {
            settings: settings.clone(),
            records,
            index,
            embedder,
            rate_limiter: Arc::new(RateLimiter::new()),
            ingest,
            search,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ingest(&self) -> &IngestWorkflow {
        &self.ingest
    }

    pub fn search(&self) -> &SearchWorkflow {
        &self.search
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Admission check against the configured window. Always admits when
    /// rate limiting is disabled.
    pub fn admit(&self, client_id: &str) -> bool {
        let limits = &self.settings.rate_limit;
        if !limits.enabled {
            return true;
        }
        self.rate_limiter.is_allowed(
            client_id,
            limits.requests_per_window,
            Duration::from_secs(limits.window_secs),
        )
    }

    pub fn index_stats(&self) -> Result<IndexStats, IndexError> {
        self.index.stats()
    }

    pub fn health(&self) -> HealthReport {
        let backend = self.index.backend();
        let vector_index = ComponentHealth::from_result(self.index.stats().map(|stats| IndexHealth {
            backend,
            total_vectors: stats.total_vectors,
            dimension: stats.dimension,
            pending_unsaved_count: stats.pending_unsaved_count,
        }));

        let info = self.embedder.info();
        let embedder = ComponentHealth::Healthy(EmbedderHealth {
            model: info.name.clone(),
            dimension: info.dimension,
        });

        let record_store = ComponentHealth::from_result(
            self.records
                .count()
                .map(|records| RecordStoreHealth { records }),
        );

        HealthReport {
            vector_index,
            embedder,
            record_store,
        }
    }

    /// Flush the index to durable storage.
    pub fn shutdown(self) -> Result<(), IndexError> {
        info!("Shutting down, saving vector index");
        self.index.save().inspect_err(|e| {
            warn!(error = %e, "Final index save failed");
        })
    }
}
