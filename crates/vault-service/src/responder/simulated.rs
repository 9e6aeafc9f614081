//! Deterministic offline responder.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{ResponseError, ResponseGenerator};

/// Builds a canned reply from a hash of the prompt and its first words.
///
/// Identical prompts always get identical responses.
#[derive(Debug, Default, Clone)]
pub struct SimulatedResponder;

impl SimulatedResponder {
    pub fn new() -> Self {
        Self
    }

    /// SHA-256 of the prompt, read as a big-endian integer, modulo 10000.
    fn seed(prompt: &str) -> u32 {
        let digest = Sha256::digest(prompt.as_bytes());
        digest
            .iter()
            .fold(0u32, |acc, byte| (acc * 256 + u32::from(*byte)) % 10_000)
    }
}

#[async_trait]
impl ResponseGenerator for SimulatedResponder {
    async fn generate(&self, prompt: &str) -> Result<String, ResponseError> {
        if prompt.trim().is_empty() {
            return Err(ResponseError::EmptyPrompt);
        }

        let lowered = prompt.to_lowercase();
        let keywords = lowered.split_whitespace().take(3).collect::<Vec<_>>().join(" ");
        Ok(format!(
            "[SimResponse-{}] Response about: {}",
            Self::seed(prompt),
            keywords
        ))
    }
}
