//! Durability across process restarts, simulated by reopening contexts.

use pretty_assertions::assert_eq;

use e2e_tests::{sample_prompts, TestHarness};
use vault_storage::RecordStore;

#[tokio::test]
async fn test_records_and_vectors_survive_reopen() {
    let harness = TestHarness::new();
    let context = harness.context();

    let mut stored = Vec::new();
    for prompt in sample_prompts() {
        stored.push(context.ingest().execute(prompt).await.unwrap());
    }

    let context = harness.reopen(context);
    assert_eq!(context.index_stats().unwrap().total_vectors, stored.len());
    assert_eq!(context.records().count().unwrap(), stored.len());

    for record in &stored {
        let results = context.search().execute(&record.prompt, 1).await.unwrap();
        assert_eq!(results, vec![record.clone()]);
    }
}

#[tokio::test]
async fn test_batch_autosave_without_shutdown() {
    let mut harness = TestHarness::new();
    harness.settings.vector.autosave_batch = 2;
    let context = harness.context();

    context.ingest().execute("first").await.unwrap();
    assert!(!harness.vector_path.exists());

    context.ingest().execute("second").await.unwrap();
    assert!(harness.vector_path.exists());
    assert!(harness.ids_path.exists());
    assert_eq!(context.index_stats().unwrap().pending_unsaved_count, 0);

    // Dropped without shutdown: only the autosaved prefix is durable.
    context.ingest().execute("third").await.unwrap();
    drop(context);

    let context = harness.context();
    assert_eq!(context.index_stats().unwrap().total_vectors, 2);
    assert_eq!(context.records().count().unwrap(), 3);
}

#[tokio::test]
async fn test_consecutive_saves_are_byte_identical() {
    let harness = TestHarness::new();
    let context = harness.context();
    for prompt in sample_prompts() {
        context.ingest().execute(prompt).await.unwrap();
    }

    context.index().save().unwrap();
    let vectors = std::fs::read(&harness.vector_path).unwrap();
    let ids = std::fs::read(&harness.ids_path).unwrap();

    context.index().save().unwrap();
    assert_eq!(std::fs::read(&harness.vector_path).unwrap(), vectors);
    assert_eq!(std::fs::read(&harness.ids_path).unwrap(), ids);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let harness = TestHarness::new();
    let context = harness.context();
    context.ingest().execute("will be lost").await.unwrap();
    context.shutdown().unwrap();

    std::fs::write(&harness.vector_path, b"not a snapshot").unwrap();

    let context = harness.context();
    assert_eq!(context.index_stats().unwrap().total_vectors, 0);
    // Records are untouched; only the index is rebuilt from scratch.
    assert_eq!(context.records().count().unwrap(), 1);
    assert!(context.search().execute("will be lost", 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dimension_change_starts_empty() {
    let mut harness = TestHarness::new();
    let context = harness.context();
    context.ingest().execute("old dimension").await.unwrap();
    context.shutdown().unwrap();

    harness.settings.embedding_dim = 128;
    let context = harness.context();
    let stats = context.index_stats().unwrap();
    assert_eq!(stats.total_vectors, 0);
    assert_eq!(stats.dimension, 128);
}
