//! Error types shared across prompt-vault crates.

use thiserror::Error;

/// Configuration-level error.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// A setting holds a value outside its allowed range
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

impl VaultError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        VaultError::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
