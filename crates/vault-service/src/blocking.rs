//! Embedding, index and record store calls moved onto the blocking thread pool.

use std::sync::Arc;

use vault_embeddings::{Embedder, EmbeddingError, Fingerprint};
use vault_storage::{RecordStore, StorageError};
use vault_types::PromptRecord;
use vault_vector::{IndexError, SimilarityResult, VectorIndex};

use crate::error::ServiceError;

pub(crate) async fn embed(
    embedder: &Arc<dyn Embedder>,
    text: &str,
) -> Result<Fingerprint, ServiceError> {
    let embedder = Arc::clone(embedder);
    let text = text.to_string();
    let fingerprint = tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .map_err(|e| {
            ServiceError::Embedding(EmbeddingError::Model(format!("embedding task failed: {e}")))
        })?
        .map_err(ServiceError::Embedding)?;

    if fingerprint.is_empty() {
        return Err(ServiceError::Embedding(EmbeddingError::EmptyEmbedding));
    }
    Ok(fingerprint)
}

pub(crate) async fn index_add(
    index: &Arc<dyn VectorIndex>,
    id: &str,
    fingerprint: Fingerprint,
) -> Result<(), ServiceError> {
    let index = Arc::clone(index);
    let id = id.to_string();
    tokio::task::spawn_blocking(move || index.add(&id, &fingerprint))
        .await
        .map_err(|e| ServiceError::Index(IndexError::BackendFailure(format!("index task failed: {e}"))))?
        .map_err(ServiceError::Index)
}

pub(crate) async fn index_search(
    index: &Arc<dyn VectorIndex>,
    query: Fingerprint,
    k: usize,
) -> Result<Vec<SimilarityResult>, ServiceError> {
    let index = Arc::clone(index);
    tokio::task::spawn_blocking(move || index.search(&query, k))
        .await
        .map_err(|e| ServiceError::Index(IndexError::BackendFailure(format!("index task failed: {e}"))))?
        .map_err(ServiceError::Index)
}

pub(crate) async fn save_record(
    records: &Arc<dyn RecordStore>,
    record: PromptRecord,
) -> Result<PromptRecord, ServiceError> {
    let records = Arc::clone(records);
    tokio::task::spawn_blocking(move || records.save(&record).map(|()| record))
        .await
        .map_err(|e| ServiceError::Repository(StorageError::Unavailable(format!("store task failed: {e}"))))?
        .map_err(ServiceError::Repository)
}

/// Look up every id in one blocking task; results keep the order of `ids`.
pub(crate) async fn find_records(
    records: &Arc<dyn RecordStore>,
    ids: Vec<String>,
) -> Result<Vec<(String, Result<Option<PromptRecord>, StorageError>)>, ServiceError> {
    let records = Arc::clone(records);
    tokio::task::spawn_blocking(move || {
        ids.into_iter()
            .map(|id| {
                let found = records.find_by_id(&id);
                (id, found)
            })
            .collect()
    })
    .await
    .map_err(|e| ServiceError::Repository(StorageError::Unavailable(format!("store task failed: {e}"))))
}
