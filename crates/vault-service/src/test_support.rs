//! Fakes and fixtures shared by workflow tests.

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use async_trait::async_trait;
use tempfile::TempDir;
use vault_embeddings::{Embedder, EmbeddingError, Fingerprint, HashingEmbedder, ModelInfo, SharedEmbedder};
use vault_storage::{MemoryRecordStore, RecordStore, StorageError};
use vault_types::PromptRecord;
use vault_vector::{FlatConfig, FlatIndex, IndexError, IndexStats, ScoreKind, SimilarityResult, VectorIndex};

use crate::ingest::IngestWorkflow;
use crate::responder::{ResponseError, ResponseGenerator, SimulatedResponder};
use crate::search::SearchWorkflow;
use crate::validate::InputValidator;

/// Real in-process components over a temp directory.
pub struct Fixture {
    pub dimension: usize,
    pub responder: Arc<SimulatedResponder>,
    pub records: Arc<MemoryRecordStore>,
    pub index: Arc<FlatIndex>,
    pub embedder: Arc<SharedEmbedder>,
    _temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let dimension = 64;
        let index = FlatIndex::open(FlatConfig::new(
            dimension,
            temp_dir.path().join("vectors.bin"),
        ));

        Self {
            dimension,
            responder: Arc::new(SimulatedResponder::new()),
            records: Arc::new(MemoryRecordStore::new()),
            index: Arc::new(index),
            embedder: Arc::new(SharedEmbedder::new(HashingEmbedder::new(dimension))),
            _temp_dir: temp_dir,
        }
    }

    pub fn ingest(&self) -> IngestWorkflow {
        IngestWorkflow::new(
            self.responder.clone(),
            self.records.clone(),
            self.index.clone(),
            self.embedder.clone(),
            InputValidator::new(2000),
        )
    }

    pub fn search(&self) -> SearchWorkflow {
        SearchWorkflow::new(
            self.index.clone(),
            self.embedder.clone(),
            self.records.clone(),
            InputValidator::new(2000),
            100,
        )
    }
}

pub struct FailingResponder;

#[async_trait]
impl ResponseGenerator for FailingResponder {
    async fn generate(&self, _prompt: &str) -> Result<String, ResponseError> {
        Err(ResponseError::ApiError("HTTP 503: unavailable".to_string()))
    }
}

pub struct FailingStore;

impl RecordStore for FailingStore {
    fn save(&self, _record: &PromptRecord) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }

    fn find_by_id(&self, _id: &str) -> Result<Option<PromptRecord>, StorageError> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }
}

/// Delegates to an inner store but fails lookups of one id.
pub struct FlakyStore {
    inner: Arc<MemoryRecordStore>,
    broken_id: String,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryRecordStore>, broken_id: &str) -> Self {
        Self {
            inner,
            broken_id: broken_id.to_string(),
        }
    }
}

impl RecordStore for FlakyStore {
    fn save(&self, record: &PromptRecord) -> Result<(), StorageError> {
        self.inner.save(record)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StorageError> {
        if id == self.broken_id {
            return Err(StorageError::Unavailable("connection reset".to_string()));
        }
        self.inner.find_by_id(id)
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.inner.count()
    }
}

/// Delegates to an inner store and remembers which thread served each call.
pub struct ThreadTrackingStore {
    inner: Arc<MemoryRecordStore>,
    threads: Mutex<Vec<ThreadId>>,
}

impl ThreadTrackingStore {
    pub fn new(inner: Arc<MemoryRecordStore>) -> Self {
        Self {
            inner,
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().unwrap().clone()
    }

    fn track(&self) {
        self.threads.lock().unwrap().push(thread::current().id());
    }
}

impl RecordStore for ThreadTrackingStore {
    fn save(&self, record: &PromptRecord) -> Result<(), StorageError> {
        self.track();
        self.inner.save(record)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StorageError> {
        self.track();
        self.inner.find_by_id(id)
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.inner.count()
    }
}

pub struct FailingEmbedder {
    info: ModelInfo,
}

impl FailingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "failing".to_string(),
                dimension,
            },
        }
    }
}

impl Embedder for FailingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, _text: &str) -> Result<Fingerprint, EmbeddingError> {
        Err(EmbeddingError::Model("model not loaded".to_string()))
    }
}

pub struct FailingIndex;

impl VectorIndex for FailingIndex {
    fn backend(&self) -> &'static str {
        "failing"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Distance
    }

    fn add(&self, _id: &str, _vector: &Fingerprint) -> Result<(), IndexError> {
        Err(IndexError::BackendFailure("connection refused".to_string()))
    }

    fn search(&self, _query: &Fingerprint, _k: usize) -> Result<Vec<SimilarityResult>, IndexError> {
        Err(IndexError::BackendFailure("connection refused".to_string()))
    }

    fn save(&self) -> Result<(), IndexError> {
        Ok(())
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        Err(IndexError::BackendFailure("connection refused".to_string()))
    }
}
