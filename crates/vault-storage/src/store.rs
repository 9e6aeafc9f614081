//! Record store trait.

use vault_types::PromptRecord;

use crate::error::StorageError;

/// Durable id -> record mapping.
///
/// Records are write-once: `save` refuses an id that already exists.
pub trait RecordStore: Send + Sync {
    fn save(&self, record: &PromptRecord) -> Result<(), StorageError>;

    fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StorageError>;

    fn count(&self) -> Result<usize, StorageError>;
}
