//! Notes service
//!
//! High-level entry points over the note repository. Presentation
//! consumers get `NoteView` values with string timestamps; the raw
//! entity stays internal to callers that need native times.

use crate::database::{Note, NoteChanges, NoteDraft, NoteRepository, NoteView};
use crate::error::Result;

/// Service for managing journal entries
#[derive(Clone)]
pub struct NotesService {
    repo: NoteRepository,
}

impl NotesService {
    pub fn new(repo: NoteRepository) -> Self {
        Self { repo }
    }

    /// Create a new note
    pub async fn create_note(&self, draft: NoteDraft) -> Result<Note> {
        tracing::info!("Creating note ({} source)", draft.source);

        let note = self.repo.add(draft).await?;

        tracing::info!("Note created successfully: {}", note.id);
        Ok(note)
    }

    /// Get a note by id, `None` if absent
    pub async fn get_note(&self, id: i64) -> Result<Option<Note>> {
        self.repo.get(id).await
    }

    /// List notes, most recently touched first
    pub async fn list_notes(&self, limit: i64, offset: i64) -> Result<Vec<Note>> {
        self.repo.list(limit, offset).await
    }

    /// List notes serialized for presentation consumers
    pub async fn list_note_views(&self, limit: i64, offset: i64) -> Result<Vec<NoteView>> {
        let notes = self.repo.list(limit, offset).await?;
        Ok(notes.iter().map(NoteView::from).collect())
    }

    /// Merge the supplied fields into a note, `None` for an unknown id
    pub async fn update_note(&self, id: i64, changes: NoteChanges) -> Result<Option<Note>> {
        tracing::debug!("Updating note: {}", id);
        self.repo.update(id, changes).await
    }

    /// Delete a note; absence is tolerated
    pub async fn delete_note(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting note: {}", id);
        self.repo.delete(id).await
    }

    /// Remove every note. Maintenance/test callers only.
    pub async fn clear_notes(&self) -> Result<()> {
        tracing::warn!("Clearing all notes");
        self.repo.clear().await
    }
}
