//! Note model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::is_blank;

/// Backend-assigned note identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A row of the `notes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Owning user; row-level security on the backend keys off this column
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Absent until the first edit
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Time of the last edit, falling back to creation time.
    #[must_use]
    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// First `max_lines` lines of the content, for list rows.
    #[must_use]
    pub fn content_preview(&self, max_lines: usize) -> String {
        self.content
            .lines()
            .take(max_lines)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Insert payload for a new note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub user_id: String,
    pub title: String,
    pub content: String,
}

/// Update payload written by the detail screen's save action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl NotePatch {
    /// Patch stamped with the current time.
    #[must_use]
    pub fn now(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            updated_at: Utc::now(),
        }
    }
}

/// A title is submittable when it has at least one non-whitespace character.
#[must_use]
pub fn is_valid_title(title: &str) -> bool {
    !is_blank(title)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_note(content: &str) -> Note {
        Note {
            id: NoteId::new("n-1"),
            user_id: "user-1".to_string(),
            title: "Groceries".to_string(),
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn content_preview_keeps_first_two_lines() {
        let note = sample_note("Milk\nEggs\nBread\nButter");
        assert_eq!(note.content_preview(2), "Milk\nEggs");
        assert_eq!(sample_note("").content_preview(2), "");
    }

    #[test]
    fn last_updated_falls_back_to_created() {
        let mut note = sample_note("Milk");
        assert_eq!(note.last_updated_at(), note.created_at);

        let edited = Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
        note.updated_at = Some(edited);
        assert_eq!(note.last_updated_at(), edited);
    }

    #[test]
    fn title_validation_rejects_whitespace() {
        assert!(!is_valid_title(""));
        assert!(!is_valid_title("   \t"));
        assert!(is_valid_title(" Groceries "));
    }

    #[test]
    fn deserializes_postgrest_row() {
        let payload = r#"{
            "id": "0b4f6c1e-5a3d-4a43-9d7e-1c1b2f0a9e11",
            "user_id": "user-1",
            "title": "Groceries",
            "content": "Milk, eggs",
            "created_at": "2024-03-05T09:30:00.123456+00:00",
            "updated_at": null
        }"#;
        let note: Note = serde_json::from_str(payload).unwrap();
        assert_eq!(note.id.as_str(), "0b4f6c1e-5a3d-4a43-9d7e-1c1b2f0a9e11");
        assert_eq!(note.content, "Milk, eggs");
        assert!(note.updated_at.is_none());
    }
}
