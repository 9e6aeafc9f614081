//! Record storage for prompt-vault.
//!
//! Persists `PromptRecord`s by id. Two implementations of [`RecordStore`]:
//! - [`Storage`]: RocksDB-backed, one column family for records
//! - [`MemoryRecordStore`]: in-process map for tests and ephemeral runs

pub mod db;
pub mod error;
pub mod memory;
pub mod store;

pub use db::{Storage, CF_PROMPTS};
pub use error::StorageError;
pub use memory::MemoryRecordStore;
pub use store::RecordStore;
