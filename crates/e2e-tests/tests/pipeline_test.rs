//! Ingest-to-search pipeline tests over real components.

use pretty_assertions::assert_eq;

use e2e_tests::{sample_prompts, TestHarness};
use vault_storage::RecordStore;

#[tokio::test]
async fn test_ingest_then_search_finds_record() {
    let harness = TestHarness::new();
    let context = harness.context();

    let record = context.ingest().execute("hello").await.unwrap();
    assert_eq!(record.prompt, "hello");

    let results = context.search().execute("hello", 1).await.unwrap();
    assert_eq!(results, vec![record]);
}

#[tokio::test]
async fn test_search_ranks_related_prompts_first() {
    let harness = TestHarness::new();
    let context = harness.context();

    let mut records = Vec::new();
    for prompt in sample_prompts() {
        records.push(context.ingest().execute(prompt).await.unwrap());
    }

    let results = context.search().execute("rust ownership", 2).await.unwrap();
    let mut prompts: Vec<&str> = results.iter().map(|r| r.prompt.as_str()).collect();
    prompts.sort();
    assert_eq!(
        prompts,
        vec![
            "Explain Rust lifetimes and ownership with examples",
            "How does the Rust borrow checker track ownership?",
        ]
    );

    let results = context
        .search()
        .execute("sourdough bread", 2)
        .await
        .unwrap();
    assert!(results.iter().all(|r| r.prompt.contains("ourdough")));
}

#[tokio::test]
async fn test_responses_are_deterministic() {
    let harness = TestHarness::new();
    let context = harness.context();

    let first = context.ingest().execute("Explain Vector Search").await.unwrap();
    let second = context.ingest().execute("Explain Vector Search").await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.response, second.response);
    assert!(first
        .response
        .ends_with("Response about: explain vector search"));
}

#[tokio::test]
async fn test_every_ingest_stores_record_and_vector() {
    let harness = TestHarness::new();
    let context = harness.context();

    for prompt in sample_prompts() {
        context.ingest().execute(prompt).await.unwrap();
    }

    assert_eq!(context.records().count().unwrap(), 5);
    assert_eq!(context.index_stats().unwrap().total_vectors, 5);
    assert!(context.health().is_healthy());
}

#[tokio::test]
async fn test_concurrent_ingest() {
    let harness = TestHarness::new();
    let context = std::sync::Arc::new(harness.context());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let context = std::sync::Arc::clone(&context);
            tokio::spawn(async move {
                context
                    .ingest()
                    .execute(&format!("concurrent prompt number {i}"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(context.index_stats().unwrap().total_vectors, 8);
    assert_eq!(context.records().count().unwrap(), 8);
}
