//! Repository layer for the notes store
//!
//! The sole mutation/query path to the `notes` table. Absence is reported
//! with `Option`, never an error: get/update return `None` for unknown ids,
//! delete and clear succeed unconditionally.

use super::models::{Note, NoteChanges, NoteDraft};
use crate::config::{MAX_AUDIO_PATH_LEN, MAX_EMOTION_LEN, MAX_SOURCE_LEN};
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;

/// CRUD wrapper for the `notes` table
#[derive(Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new note; the store assigns id and timestamps
    pub async fn add(&self, draft: NoteDraft) -> Result<Note> {
        if draft.text.trim().is_empty() {
            return Err(AppError::Validation("note text must not be empty".to_string()));
        }
        if draft.emotion.trim().is_empty() {
            return Err(AppError::Validation("emotion label must not be empty".to_string()));
        }
        if draft.emotion.chars().count() > MAX_EMOTION_LEN {
            return Err(AppError::Validation("emotion label is too long".to_string()));
        }
        if draft.source.chars().count() > MAX_SOURCE_LEN {
            return Err(AppError::Validation("source tag is too long".to_string()));
        }
        if let Some(path) = &draft.audio_path {
            if path.chars().count() > MAX_AUDIO_PATH_LEN {
                return Err(AppError::Validation("audio path is too long".to_string()));
            }
        }

        let now = Utc::now();

        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (created_at, updated_at, text, audio_path, emotion, score, source)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(&draft.text)
        .bind(&draft.audio_path)
        .bind(&draft.emotion)
        .bind(draft.score)
        .bind(&draft.source)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created note: {}", note.id);
        Ok(note)
    }

    /// Get a note by id, `None` if absent
    pub async fn get(&self, id: i64) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    /// List notes most-recently-touched first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            ORDER BY updated_at DESC, created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Merge the supplied fields into an existing note.
    ///
    /// `updated_at` is stamped on every call, including one with no field
    /// changes. Returns the refreshed note, or `None` for an unknown id.
    pub async fn update(&self, id: i64, changes: NoteChanges) -> Result<Option<Note>> {
        let now = Utc::now();

        // Build the SET clause from the supplied fields only
        let mut sql = "UPDATE notes SET updated_at = ?".to_string();
        if changes.text.is_some() {
            sql.push_str(", text = ?");
        }
        if changes.emotion.is_some() {
            sql.push_str(", emotion = ?");
        }
        if changes.score.is_some() {
            sql.push_str(", score = ?");
        }
        if changes.source.is_some() {
            sql.push_str(", source = ?");
        }
        if changes.audio_path.is_some() {
            sql.push_str(", audio_path = ?");
        }
        if changes.created_at.is_some() {
            sql.push_str(", created_at = ?");
        }
        sql.push_str(" WHERE id = ? RETURNING *");

        // Bind in the same order the clause was built
        let mut query = sqlx::query_as::<_, Note>(&sql).bind(now);
        if let Some(text) = &changes.text {
            query = query.bind(text);
        }
        if let Some(emotion) = &changes.emotion {
            query = query.bind(emotion);
        }
        if let Some(score) = changes.score {
            query = query.bind(score);
        }
        if let Some(source) = &changes.source {
            query = query.bind(source);
        }
        if let Some(audio_path) = &changes.audio_path {
            query = query.bind(audio_path);
        }
        if let Some(created_at) = changes.created_at {
            query = query.bind(created_at);
        }

        let note = query.bind(id).fetch_optional(&self.pool).await?;

        if note.is_some() {
            tracing::debug!("Updated note: {}", id);
        }
        Ok(note)
    }

    /// Remove a note; absence is silently tolerated
    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted note {} ({} rows)", id, rows);
        Ok(())
    }

    /// Remove every note. Reserved for maintenance and test callers.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM notes").execute(&self.pool).await?;

        tracing::debug!("Cleared notes table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;

    async fn create_test_repo() -> NoteRepository {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        NoteRepository::new(pool)
    }

    // Timestamps carry sub-second precision; a short pause keeps them distinct.
    async fn tick() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test]
    async fn test_add_and_get_roundtrip() {
        let repo = create_test_repo().await;

        let note = repo
            .add(NoteDraft::new("first entry", "joy"))
            .await
            .unwrap();

        assert!(note.id > 0);
        assert!(note.created_at <= note.updated_at);

        let fetched = repo.get(note.id).await.unwrap().unwrap();
        assert_eq!(fetched.text, "first entry");
        assert_eq!(fetched.emotion, "joy");
        assert_eq!(fetched.source, "voice");
        assert_eq!(fetched.score, None);
        assert_eq!(fetched.audio_path, None);
    }

    #[tokio::test]
    async fn test_add_with_all_fields() {
        let repo = create_test_repo().await;

        let note = repo
            .add(
                NoteDraft::new("edge case", "sadness")
                    .with_score(0.01)
                    .with_source("import")
                    .with_audio_path("/tmp/edge.wav"),
            )
            .await
            .unwrap();

        assert_eq!(note.emotion, "sadness");
        assert_eq!(note.score, Some(0.01));
        assert_eq!(note.source, "import");
        assert_eq!(note.audio_path.as_deref(), Some("/tmp/edge.wav"));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_required_fields() {
        let repo = create_test_repo().await;

        let err = repo.add(NoteDraft::new("  ", "joy")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = repo.add(NoteDraft::new("text", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_enforces_schema_caps() {
        let repo = create_test_repo().await;

        let err = repo
            .add(NoteDraft::new("text", "e".repeat(33)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = repo
            .add(NoteDraft::new("text", "joy").with_source("s".repeat(17)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_nonexistent_is_none() {
        let repo = create_test_repo().await;
        assert!(repo.get(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_most_recently_touched_first() {
        let repo = create_test_repo().await;

        for n in 0..3 {
            repo.add(NoteDraft::new(format!("note {}", n), "neutral").with_source("edit"))
                .await
                .unwrap();
            tick().await;
        }

        let texts: Vec<String> = repo
            .list(100, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        assert_eq!(texts, vec!["note 2", "note 1", "note 0"]);
    }

    #[tokio::test]
    async fn test_list_update_moves_note_to_front() {
        let repo = create_test_repo().await;

        let first = repo.add(NoteDraft::new("a", "joy")).await.unwrap();
        tick().await;
        repo.add(NoteDraft::new("b", "sadness")).await.unwrap();
        tick().await;

        repo.update(
            first.id,
            NoteChanges {
                text: Some("a touched".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let texts: Vec<String> = repo
            .list(100, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        assert_eq!(texts, vec!["a touched", "b"]);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = create_test_repo().await;

        for n in 0..3 {
            repo.add(NoteDraft::new(format!("note {}", n), "neutral"))
                .await
                .unwrap();
            tick().await;
        }

        let page = repo.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].text, "note 1");

        let empty = repo.list(10, 10).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_supplied_fields_only() {
        let repo = create_test_repo().await;

        let note = repo.add(NoteDraft::new("orig", "sadness")).await.unwrap();
        tick().await;

        let updated = repo
            .update(
                note.id,
                NoteChanges {
                    text: Some("updated".to_string()),
                    emotion: Some("joy".to_string()),
                    score: Some(0.99),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.text, "updated");
        assert_eq!(updated.emotion, "joy");
        assert_eq!(updated.score, Some(0.99));
        assert_eq!(updated.source, "voice");
        assert!(updated.updated_at > note.updated_at);
        assert_eq!(updated.created_at, note.created_at);
    }

    #[tokio::test]
    async fn test_update_single_field_leaves_rest_untouched() {
        let repo = create_test_repo().await;

        let note = repo
            .add(NoteDraft::new("orig-text", "joy").with_score(0.5))
            .await
            .unwrap();
        tick().await;

        let updated = repo
            .update(
                note.id,
                NoteChanges {
                    text: Some("only-text-changed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.text, "only-text-changed");
        assert_eq!(updated.emotion, "joy");
        assert_eq!(updated.score, Some(0.5));
        assert_eq!(updated.source, "voice");
        assert!(updated.updated_at > note.updated_at);
    }

    #[tokio::test]
    async fn test_update_created_at_directly() {
        let repo = create_test_repo().await;

        let note = repo.add(NoteDraft::new("rescheduled", "neutral")).await.unwrap();
        let new_created = note.created_at - chrono::Duration::hours(6);

        let updated = repo
            .update(
                note.id,
                NoteChanges {
                    created_at: Some(new_created),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.created_at, new_created);
        assert_eq!(updated.text, "rescheduled");
        assert_eq!(updated.emotion, "neutral");
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_none() {
        let repo = create_test_repo().await;

        let result = repo
            .update(
                12345,
                NoteChanges {
                    text: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let repo = create_test_repo().await;

        let note = repo.add(NoteDraft::new("to delete", "sadness")).await.unwrap();
        repo.delete(note.id).await.unwrap();

        assert!(repo.get(note.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_silent() {
        let repo = create_test_repo().await;

        let keeper = repo.add(NoteDraft::new("still here", "neutral")).await.unwrap();
        repo.delete(123_456).await.unwrap();

        assert!(repo.get(keeper.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let repo = create_test_repo().await;

        repo.add(NoteDraft::new("a", "joy")).await.unwrap();
        repo.add(NoteDraft::new("b", "fear")).await.unwrap();

        repo.clear().await.unwrap();

        assert!(repo.list(100, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let repo = create_test_repo().await;
        assert!(repo.list(20, 0).await.unwrap().is_empty());
    }
}
