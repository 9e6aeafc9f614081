//! In-process record store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use vault_types::PromptRecord;

use crate::error::StorageError;
use crate::store::RecordStore;

/// Concurrent map of records; contents are lost when dropped.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, PromptRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn save(&self, record: &PromptRecord) -> Result<(), StorageError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(record.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StorageError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_count() {
        let store = MemoryRecordStore::new();
        let record = PromptRecord::new("hello", "world");
        store.save(&record).unwrap();

        assert_eq!(store.find_by_id(&record.id).unwrap(), Some(record.clone()));
        assert_eq!(store.count().unwrap(), 1);
        assert!(matches!(
            store.save(&record),
            Err(StorageError::AlreadyExists(_))
        ));
    }
}
