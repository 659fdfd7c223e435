//! Capture entry model.
//!
//! # Invariants
//! - `content` is trimmed and non-empty.
//! - `(content, source_url)` is the dedup key inside one capture log.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one captured snippet.
pub type EntryId = Uuid;

/// One recorded snippet of copied or selected text with its page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEntry {
    /// Lists written by older clients carry no id or a numeric one; a
    /// fresh id is minted on load.
    #[serde(default = "Uuid::new_v4", deserialize_with = "deserialize_entry_id")]
    pub id: EntryId,
    pub content: String,
    #[serde(rename = "url", default)]
    pub source_url: String,
    #[serde(rename = "title", default)]
    pub source_title: String,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntryId {
    Current(Uuid),
    Legacy(IgnoredAny),
}

fn deserialize_entry_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryId, D::Error> {
    Ok(match StoredEntryId::deserialize(deserializer)? {
        StoredEntryId::Current(id) => id,
        StoredEntryId::Legacy(_) => Uuid::new_v4(),
    })
}

/// Validation failure for a capture entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureValidationError {
    EmptyContent,
}

impl Display for CaptureValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "capture content cannot be empty"),
        }
    }
}

impl Error for CaptureValidationError {}

impl CaptureEntry {
    /// Builds an entry stamped with the current time.
    ///
    /// Returns `None` when `content` is empty after trimming.
    pub fn new(
        content: &str,
        source_url: impl Into<String>,
        source_title: impl Into<String>,
    ) -> Option<Self> {
        let content = normalize_content(content)?;
        Some(Self {
            id: Uuid::new_v4(),
            content,
            source_url: source_url.into(),
            source_title: source_title.into(),
            captured_at: Utc::now(),
        })
    }

    /// Returns whether this entry has the given dedup key.
    pub fn has_key(&self, content: &str, source_url: &str) -> bool {
        self.content == content && self.source_url == source_url
    }

    /// Case-insensitive substring match on content, url and title.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches(&self, needle_lower: &str) -> bool {
        [&self.content, &self.source_url, &self.source_title]
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }

    pub fn validate(&self) -> Result<(), CaptureValidationError> {
        if self.content.trim().is_empty() {
            return Err(CaptureValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Trims candidate content, mapping blank input to `None`.
pub fn normalize_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_content, CaptureEntry};

    #[test]
    fn new_trims_and_rejects_blank_content() {
        let entry = CaptureEntry::new("  hello \n", "https://a.com", "A").expect("entry");
        assert_eq!(entry.content, "hello");
        assert!(CaptureEntry::new(" \t ", "", "").is_none());
        assert_eq!(normalize_content(""), None);
    }

    #[test]
    fn matches_is_case_insensitive_across_fields() {
        let entry = CaptureEntry::new("Rust Ownership", "https://Docs.rs", "Docs").expect("entry");
        assert!(entry.matches("ownership"));
        assert!(entry.matches("docs.rs"));
        assert!(entry.matches("doc"));
        assert!(!entry.matches("python"));
    }

    #[test]
    fn deserializes_extension_shape_without_id() {
        let json = r#"{
            "content": "copied",
            "url": "https://a.com",
            "title": "A",
            "timestamp": "2024-05-01T10:00:00.000Z"
        }"#;
        let entry: CaptureEntry = serde_json::from_str(json).expect("extension entry");
        assert_eq!(entry.content, "copied");
        assert_eq!(entry.source_url, "https://a.com");
        assert!(!entry.id.is_nil());
    }

    #[test]
    fn keeps_uuid_ids_and_replaces_numeric_ones() {
        let stored = CaptureEntry::new("kept", "", "").expect("entry");
        let json = serde_json::to_string(&stored).expect("encode");
        let decoded: CaptureEntry = serde_json::from_str(&json).expect("decode");
        assert_eq!(decoded.id, stored.id);

        let legacy = r#"{"id":1714550400000,"content":"a","url":"","title":"","timestamp":"2024-05-01T08:00:00.000Z"}"#;
        let entry: CaptureEntry = serde_json::from_str(legacy).expect("numeric id");
        assert!(!entry.id.is_nil());
    }
}
