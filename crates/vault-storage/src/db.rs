//! RocksDB-backed record store.
//!
//! Records are JSON-encoded under their id in the `prompts` column family.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use tracing::{debug, info};
use vault_types::PromptRecord;

use crate::error::StorageError;
use crate::store::RecordStore;

/// Column family name for prompt records
pub const CF_PROMPTS: &str = "prompts";

/// Main storage interface for prompt records
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        let cf = ColumnFamilyDescriptor::new(CF_PROMPTS, cf_opts);

        let db = DB::open_cf_descriptors(&db_opts, path, vec![cf])?;
        Ok(Self { db })
    }

    fn cf(&self) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_PROMPTS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PROMPTS.to_string()))
    }
}

impl RecordStore for Storage {
    fn save(&self, record: &PromptRecord) -> Result<(), StorageError> {
        let cf = self.cf()?;
        if self.db.get_cf(cf, record.id.as_bytes())?.is_some() {
            return Err(StorageError::AlreadyExists(record.id.clone()));
        }

        let value = serde_json::to_vec(record)?;
        self.db.put_cf(cf, record.id.as_bytes(), value)?;
        debug!(id = %record.id, "Stored record");
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StorageError> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<usize, StorageError> {
        let cf = self.cf()?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
