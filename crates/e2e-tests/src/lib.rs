//! End-to-end test infrastructure for prompt-vault.
//!
//! Provides a shared TestHarness that builds full contexts (RocksDB record
//! store, flat vector index, hashing embedder, simulated responder) over a
//! temp directory, and can reopen them at the same paths.

use std::path::PathBuf;

use vault_service::VaultContext;
use vault_types::Settings;

/// Fingerprint dimension used by every harness context.
pub const TEST_DIMENSION: usize = 384;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Settings pointing every component into the temp dir
    pub settings: Settings,
    /// Vector snapshot file
    pub vector_path: PathBuf,
    /// Id list file paired with the vector snapshot
    pub ids_path: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a temp directory and settings.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let vector_path = temp_dir.path().join("vector-index").join("vectors.bin");
        let ids_path = temp_dir.path().join("vector-index").join("vectors.bin.ids.json");

        let mut settings = Settings::default();
        settings.db_path = temp_dir.path().join("db").to_string_lossy().to_string();
        settings.vector.index_path = vector_path.to_string_lossy().to_string();
        settings.embedding_dim = TEST_DIMENSION;

        Self {
            _temp_dir: temp_dir,
            settings,
            vector_path,
            ids_path,
        }
    }

    /// Build a context from the harness settings.
    pub fn context(&self) -> VaultContext {
        VaultContext::from_settings(&self.settings).expect("Failed to build context")
    }

    /// Shut `context` down (saving the index) and open a fresh one at the
    /// same paths.
    pub fn reopen(&self, context: VaultContext) -> VaultContext {
        context.shutdown().expect("Failed to save index on shutdown");
        self.context()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Prompts on clearly separated topics.
pub fn sample_prompts() -> Vec<&'static str> {
    vec![
        "How does the Rust borrow checker track ownership?",
        "Best flour for baking sourdough bread at home",
        "Planning a hiking trip through mountain trails",
        "Explain Rust lifetimes and ownership with examples",
        "Sourdough starter feeding schedule and bread hydration",
    ]
}
