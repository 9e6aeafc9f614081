//! # vault-types
//!
//! Shared domain types for prompt-vault.
//!
//! - [`PromptRecord`]: an immutable prompt/response pair keyed by id
//! - [`Settings`]: layered configuration for every component
//! - [`VaultError`]: configuration and input errors shared across crates

pub mod config;
pub mod error;
pub mod record;

pub use config::{
    LimitSettings, RateLimitSettings, ResponderProvider, ResponderSettings, Settings,
    VectorBackend, VectorSettings,
};
pub use error::VaultError;
pub use record::PromptRecord;
