//! Search workflow: validate, embed, query the index, hydrate records.

use std::sync::Arc;

use tracing::{debug, info, warn};
use vault_embeddings::Embedder;
use vault_storage::RecordStore;
use vault_types::PromptRecord;
use vault_vector::VectorIndex;

use crate::blocking;
use crate::error::ServiceError;
use crate::validate::{sanitize_for_logging, InputValidator, DEFAULT_LOG_PREVIEW};

/// Finds the stored records closest to a query text.
pub struct SearchWorkflow {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    records: Arc<dyn RecordStore>,
    validator: InputValidator,
    max_results: usize,
}

impl SearchWorkflow {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        records: Arc<dyn RecordStore>,
        validator: InputValidator,
        max_results: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            records,
            validator,
            max_results,
        }
    }

    /// Up to `k` records in index order (most similar first).
    ///
    /// Ids the record store cannot resolve are skipped and logged, so fewer
    /// than `k` records may come back even when the index returned `k` hits.
    pub async fn execute(&self, query: &str, k: usize) -> Result<Vec<PromptRecord>, ServiceError> {
        let query = self.validator.sanitize(query, "Query")?;
        if k == 0 {
            return Err(ServiceError::Validation("k must be positive".to_string()));
        }
        if k > self.max_results {
            return Err(ServiceError::Validation(format!(
                "k too large: {k} > {}",
                self.max_results
            )));
        }
        debug!(
            query = %sanitize_for_logging(&query, DEFAULT_LOG_PREVIEW),
            k = k,
            "Searching"
        );

        let fingerprint = blocking::embed(&self.embedder, &query).await?;
        let hits = blocking::index_search(&self.index, fingerprint, k).await?;

        let ids = hits.iter().map(|hit| hit.id.clone()).collect();
        let lookups = blocking::find_records(&self.records, ids).await?;

        let mut records = Vec::with_capacity(lookups.len());
        let mut skipped = 0usize;
        for (id, found) in lookups {
            match found {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    skipped += 1;
                    warn!(id = %id, "Indexed id has no stored record");
                }
                Err(e) => {
                    skipped += 1;
                    warn!(id = %id, error = %e, "Failed to load record");
                }
            }
        }

        info!(
            hits = hits.len(),
            returned = records.len(),
            skipped = skipped,
            "Search complete"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FailingEmbedder, FailingIndex, Fixture, FlakyStore, ThreadTrackingStore,
    };
    use vault_embeddings::EmbeddingError;
    use vault_vector::IndexError;

    #[tokio::test]
    async fn test_finds_ingested_prompt() {
        let fixture = Fixture::new();
        let ingest = fixture.ingest();
        let target = ingest.execute("rust ownership and borrowing").await.unwrap();
        ingest.execute("baking sourdough bread").await.unwrap();
        ingest.execute("mountain hiking trails").await.unwrap();

        let results = fixture
            .search()
            .execute("rust ownership and borrowing", 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], target);
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty() {
        let fixture = Fixture::new();
        let results = fixture.search().execute("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_all() {
        let fixture = Fixture::new();
        fixture.ingest().execute("one").await.unwrap();
        fixture.ingest().execute("two").await.unwrap();

        let results = fixture.search().execute("one", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_validation_errors() {
        let fixture = Fixture::new();
        let search = fixture.search();
        for (query, k) in [("", 5), ("   ", 5), ("hello", 0), ("hello", 101)] {
            let err = search.execute(query, k).await.unwrap_err();
            assert!(
                matches!(err, ServiceError::Validation(_)),
                "query={query:?} k={k}: {err}"
            );
        }
        assert!(search.execute("hello", 100).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_hydration_skips_failed_lookup() {
        let fixture = Fixture::new();
        let first = fixture.ingest().execute("first prompt").await.unwrap();
        let second = fixture.ingest().execute("second prompt").await.unwrap();

        let store = FlakyStore::new(fixture.records.clone(), &second.id);
        let search = SearchWorkflow::new(
            fixture.index.clone(),
            fixture.embedder.clone(),
            Arc::new(store),
            InputValidator::new(2000),
            100,
        );

        let results = search.execute("prompt", 2).await.unwrap();
        assert_eq!(results, vec![first]);
    }

    #[tokio::test]
    async fn test_hydration_runs_off_the_runtime_thread() {
        let fixture = Fixture::new();
        let first = fixture.ingest().execute("first prompt").await.unwrap();
        let second = fixture.ingest().execute("second prompt").await.unwrap();

        let store = Arc::new(ThreadTrackingStore::new(fixture.records.clone()));
        let search = SearchWorkflow::new(
            fixture.index.clone(),
            fixture.embedder.clone(),
            store.clone(),
            InputValidator::new(2000),
            100,
        );

        let mut results = search.execute("prompt", 2).await.unwrap();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        let mut expected = vec![first, second];
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(results, expected);

        let threads = store.threads();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|t| *t != std::thread::current().id()));
    }

    #[tokio::test]
    async fn test_missing_record_is_skipped() {
        let fixture = Fixture::new();
        let kept = fixture.ingest().execute("kept prompt").await.unwrap();
        let orphan = fixture.embedder.embed("orphan vector").unwrap();
        fixture.index.add("no-such-record", &orphan).unwrap();

        let results = fixture.search().execute("orphan vector", 2).await.unwrap();
        assert_eq!(results, vec![kept]);
    }

    #[tokio::test]
    async fn test_embedding_failure() {
        let fixture = Fixture::new();
        let search = SearchWorkflow::new(
            fixture.index.clone(),
            Arc::new(FailingEmbedder::new(fixture.dimension)),
            fixture.records.clone(),
            InputValidator::new(2000),
            100,
        );
        assert!(matches!(
            search.execute("hello", 1).await,
            Err(ServiceError::Embedding(EmbeddingError::Model(_)))
        ));
    }

    #[tokio::test]
    async fn test_index_failure() {
        let fixture = Fixture::new();
        let search = SearchWorkflow::new(
            Arc::new(FailingIndex),
            fixture.embedder.clone(),
            fixture.records.clone(),
            InputValidator::new(2000),
            100,
        );
        assert!(matches!(
            search.execute("hello", 1).await,
            Err(ServiceError::Index(IndexError::BackendFailure(_)))
        ));
    }
}
