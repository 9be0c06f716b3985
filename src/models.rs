//! Core data models used throughout notekeeper.
//!
//! [`Note`] is the only stored document type. Its JSON shape (`_id`,
//! `createdAt`, `updatedAt`) is what HTTP clients see.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Cached summary from the last summarize call, empty when never summarized.
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }
}

/// Partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A validated note ready to be stored.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

/// Response body for `POST /api/notes/{id}/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Millisecond timestamps are what the SQLite store persists.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_json_field_names() {
        let ts = from_millis(1_700_000_000_123);
        let note = Note {
            id: "abc".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            summary: String::new(),
            created_at: ts,
            updated_at: ts,
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["summary"], "");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_update_missing_fields_are_none() {
        let update: NoteUpdate = serde_json::from_str(r#"{"title":"only"}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("only"));
        assert!(update.content.is_none());
    }

    #[test]
    fn test_from_millis_keeps_precision() {
        let ts = from_millis(1_700_000_000_123);
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_123);
    }
}
