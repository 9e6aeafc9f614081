//! Ingest workflow: validate, respond, persist, embed, index.

use std::sync::Arc;

use tracing::{debug, error, info};
use vault_embeddings::Embedder;
use vault_storage::RecordStore;
use vault_types::PromptRecord;
use vault_vector::VectorIndex;

use crate::blocking;
use crate::error::ServiceError;
use crate::responder::ResponseGenerator;
use crate::validate::{sanitize_for_logging, InputValidator, DEFAULT_LOG_PREVIEW};

/// Stores a prompt with a generated response and indexes its fingerprint.
///
/// The record is persisted before it is embedded. If embedding or indexing
/// fails afterwards the record stays in the store without a vector; the
/// failure is logged and returned, nothing is rolled back.
pub struct IngestWorkflow {
    responder: Arc<dyn ResponseGenerator>,
    records: Arc<dyn RecordStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    validator: InputValidator,
}

impl IngestWorkflow {
    pub fn new(
        responder: Arc<dyn ResponseGenerator>,
        records: Arc<dyn RecordStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        validator: InputValidator,
    ) -> Self {
        Self {
            responder,
            records,
            index,
            embedder,
            validator,
        }
    }

    pub async fn execute(&self, prompt: &str) -> Result<PromptRecord, ServiceError> {
        let prompt = self.validator.sanitize(prompt, "Prompt")?;
        info!(
            prompt = %sanitize_for_logging(&prompt, DEFAULT_LOG_PREVIEW),
            "Ingesting prompt"
        );

        let response = self
            .responder
            .generate(&prompt)
            .await
            .map_err(ServiceError::ResponseGeneration)?;

        let record = PromptRecord::new(prompt, response);
        let record = blocking::save_record(&self.records, record).await?;
        debug!(id = %record.id, "Record persisted");

        let fingerprint = blocking::embed(&self.embedder, &record.prompt)
            .await
            .inspect_err(|e| {
                error!(id = %record.id, error = %e, "Record stored without a vector: embedding failed");
            })?;

        blocking::index_add(&self.index, &record.id, fingerprint)
            .await
            .inspect_err(|e| {
                error!(id = %record.id, error = %e, "Record stored without a vector: indexing failed");
            })?;

        info!(id = %record.id, "Prompt ingested");
        Ok(record)
    }
}
