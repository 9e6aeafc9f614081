//! # vault-service
//!
//! Request orchestration for prompt-vault.
//!
//! - [`IngestWorkflow`]: validate, respond, persist, embed, index
//! - [`SearchWorkflow`]: validate, embed, search, hydrate
//! - [`RateLimiter`]: per-client sliding-window admission gate
//! - [`VaultContext`]: wires every component from [`vault_types::Settings`]
//!
//! Every failure surfaces as a [`ServiceError`] variant naming the stage that
//! failed, with the underlying error kept as its source.

mod blocking;
pub mod context;
pub mod error;
pub mod ingest;
pub mod rate_limit;
pub mod responder;
pub mod search;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use context::{ComponentHealth, ContextError, HealthReport, VaultContext};
pub use error::ServiceError;
pub use ingest::IngestWorkflow;
pub use rate_limit::{RateLimitStats, RateLimiter};
pub use responder::{
    ApiResponder, ApiResponderConfig, ResponseError, ResponseGenerator, SimulatedResponder,
};
pub use search::SearchWorkflow;
pub use validate::{sanitize_for_logging, InputValidator};
