//! Prompt record type.
//!
//! A record is written once by the ingest workflow and never mutated or
//! deleted afterwards. The vector index refers to it only by `id`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A stored prompt together with its generated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Unique record identifier (ULID string)
    pub id: String,

    /// The validated prompt text
    pub prompt: String,

    /// Response produced for the prompt
    pub response: String,

    /// Creation time, ISO-8601 in UTC
    pub created_at: String,
}

impl PromptRecord {
    /// Create a record with a fresh id and the current UTC timestamp.
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            prompt: prompt.into(),
            response: response.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_new_record_has_unique_ids() {
        let a = PromptRecord::new("hello", "world");
        let b = PromptRecord::new("hello", "world");
        assert_ne!(a.id, b.id);
        assert_eq!(a.prompt, "hello");
        assert_eq!(a.response, "world");
    }

    #[test]
    fn test_created_at_is_iso8601_utc() {
        let record = PromptRecord::new("p", "r");
        assert!(record.created_at.ends_with('Z'));
        let parsed = DateTime::parse_from_rfc3339(&record.created_at).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_record_serialization() {
        let json = r#"{"id":"01ABC","prompt":"p","response":"r","created_at":"2024-01-15T10:00:00.000000Z"}"#;
        let decoded: PromptRecord = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.id, "01ABC");
        assert_eq!(decoded.created_at, "2024-01-15T10:00:00.000000Z");
        assert_eq!(serde_json::to_string(&decoded).unwrap(), json);
    }
}
