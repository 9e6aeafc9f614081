//! Backend selection from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vault_types::{Settings, VectorBackend};

use crate::error::IndexError;
use crate::flat::{FlatConfig, FlatIndex};
use crate::index::VectorIndex;
use crate::managed::{ManagedConfig, ManagedStoreIndex};

/// Build the index named by `settings.vector.backend`.
///
/// The managed backend connects over blocking HTTP; call this off async
/// worker threads.
pub fn open_index(settings: &Settings) -> Result<Arc<dyn VectorIndex>, IndexError> {
    let vector = &settings.vector;
    let index: Arc<dyn VectorIndex> = match vector.backend {
        VectorBackend::Flat => {
            let interval = match vector.autosave_interval_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
            let config = FlatConfig::new(settings.embedding_dim, &vector.index_path)
                .with_ids_path(vector.ids_path())
                .with_autosave_batch(vector.autosave_batch)
                .with_autosave_interval(interval);
            Arc::new(FlatIndex::open(config))
        }
        VectorBackend::Managed => {
            let config = ManagedConfig::new(
                &vector.managed_url,
                &vector.collection,
                settings.embedding_dim,
            )
            .with_timeout(Duration::from_secs(vector.request_timeout_secs));
            Arc::new(ManagedStoreIndex::connect(&config)?)
        }
    };

    info!(backend = index.backend(), "Vector index ready");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ScoreKind;
    use tempfile::TempDir;
    use vault_embeddings::Fingerprint;

    #[test]
    fn test_flat_backend_from_settings() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.embedding_dim = 4;
        settings.vector.index_path = temp
            .path()
            .join("vectors.bin")
            .to_string_lossy()
            .to_string();
        settings.vector.autosave_batch = 1;

        let index = open_index(&settings).unwrap();
        assert_eq!(index.backend(), "flat");
        assert_eq!(index.score_kind(), ScoreKind::Similarity);

        index
            .add("a", &Fingerprint::from_normalized(vec![1.0, 0.0, 0.0, 0.0]))
            .unwrap();
        assert!(temp.path().join("vectors.bin").exists());
        assert!(temp.path().join("vectors.bin.ids.json").exists());
    }
}
