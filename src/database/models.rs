//! Database models
//!
//! Rust structs representing the persisted note entity, the structured
//! create/update values, and the serialized view handed to presentation
//! consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted journal entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub text: String,
    pub audio_path: Option<String>,
    /// Label from the classifier's fixed vocabulary (joy, sadness, ...)
    pub emotion: String,
    /// Classifier confidence in [0,1]; reserved, not set by the adapter
    pub score: Option<f64>,
    /// One of "voice", "text", "edit", "import"
    pub source: String,
}

/// Values for a new note; id and timestamps are server-assigned
#[derive(Debug, Clone, Deserialize)]
pub struct NoteDraft {
    pub text: String,
    pub emotion: String,
    pub score: Option<f64>,
    pub source: String,
    pub audio_path: Option<String>,
}

impl NoteDraft {
    /// Draft with the default "voice" source and no optional fields
    pub fn new(text: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emotion: emotion.into(),
            score: None,
            source: "voice".to_string(),
            audio_path: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_audio_path(mut self, audio_path: impl Into<String>) -> Self {
        self.audio_path = Some(audio_path.into());
        self
    }
}

/// Partial update: only fields that are `Some` are written.
///
/// `created_at` is settable for maintenance and migration callers;
/// `updated_at` is always stamped by the update operation itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteChanges {
    pub text: Option<String>,
    pub emotion: Option<String>,
    pub score: Option<f64>,
    pub source: Option<String>,
    pub audio_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.emotion.is_none()
            && self.score.is_none()
            && self.source.is_none()
            && self.audio_path.is_none()
            && self.created_at.is_none()
    }
}

/// Serialized note for presentation consumers.
///
/// Timestamps are ISO-8601 strings with seconds precision; the stored
/// values keep their native representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteView {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub text: String,
    pub audio_path: Option<String>,
    pub emotion: String,
    pub score: Option<f64>,
    pub source: String,
}

fn iso_seconds(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            created_at: iso_seconds(&note.created_at),
            updated_at: iso_seconds(&note.updated_at),
            text: note.text.clone(),
            audio_path: note.audio_path.clone(),
            emotion: note.emotion.clone(),
            score: note.score,
            source: note.source.clone(),
        }
    }
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        NoteView::from(&note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn view_serializes_timestamps_to_iso_seconds() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 9, 18, 4, 7).unwrap()
            + chrono::Duration::nanoseconds(987_654_321);
        let note = Note {
            id: 3,
            created_at: ts,
            updated_at: ts,
            text: "evening walk".to_string(),
            audio_path: None,
            emotion: "joy".to_string(),
            score: None,
            source: "text".to_string(),
        };

        let view = NoteView::from(&note);
        // Fractional seconds are dropped, not rounded
        assert_eq!(view.created_at, "2025-03-09T18:04:07");
        assert_eq!(view.updated_at, "2025-03-09T18:04:07");
    }

    #[test]
    fn draft_defaults_to_voice_source() {
        let draft = NoteDraft::new("hello", "neutral");
        assert_eq!(draft.source, "voice");
        assert!(draft.score.is_none());
        assert!(draft.audio_path.is_none());
    }

    #[test]
    fn empty_changes_are_detectable() {
        assert!(NoteChanges::default().is_empty());
        let changes = NoteChanges {
            text: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
