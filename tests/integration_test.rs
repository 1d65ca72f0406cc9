//! Integration tests for moodnotes
//!
//! These tests verify end-to-end functionality over a file-backed store:
//! - Note CRUD and listing order
//! - Presentation views
//! - Aggregate analytics

use moodnotes::database::{create_pool, NoteChanges, NoteDraft, NoteRepository};
use moodnotes::services::{NoteAnalytics, NotesService};
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test database with schema
async fn create_test_service() -> (NotesService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("diary.db");
    let url = format!("sqlite://{}", db_path.display());

    let pool = create_pool(&url).await.unwrap();
    let service = NotesService::new(NoteRepository::new(pool));

    (service, temp_dir)
}

async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_note_crud_operations() {
    let (service, _temp) = create_test_service().await;

    // Create
    let note = service
        .create_note(NoteDraft::new("woke up early, feeling calm", "neutral"))
        .await
        .unwrap();

    assert!(note.id > 0);
    assert!(note.created_at <= note.updated_at);
    assert_eq!(note.source, "voice");

    // Read
    let fetched = service.get_note(note.id).await.unwrap().unwrap();
    assert_eq!(fetched.text, "woke up early, feeling calm");
    assert_eq!(fetched.emotion, "neutral");

    // Update
    tick().await;
    let updated = service
        .update_note(
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

    // Delete, then the id is gone
    service.delete_note(note.id).await.unwrap();
    assert!(service.get_note(note.id).await.unwrap().is_none());

    // Deleting again stays silent
    service.delete_note(note.id).await.unwrap();
}

#[tokio::test]
async fn test_listing_is_most_recently_touched_first() {
    let (service, _temp) = create_test_service().await;

    for n in 0..3 {
        service
            .create_note(NoteDraft::new(format!("note {}", n), "neutral").with_source("edit"))
            .await
            .unwrap();
        tick().await;
    }

    let texts: Vec<String> = service
        .list_notes(100, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.text)
        .collect();
    assert_eq!(texts, vec!["note 2", "note 1", "note 0"]);

    // Touching the oldest entry moves it to the front
    let oldest_id = service.list_notes(100, 0).await.unwrap()[2].id;
    service
        .update_note(
            oldest_id,
            NoteChanges {
                emotion: Some("joy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let first = &service.list_notes(100, 0).await.unwrap()[0];
    assert_eq!(first.id, oldest_id);
}

#[tokio::test]
async fn test_views_serialize_timestamps_for_presentation() {
    let (service, _temp) = create_test_service().await;

    service
        .create_note(NoteDraft::new("an entry", "interest").with_source("text"))
        .await
        .unwrap();

    let views = service.list_note_views(20, 0).await.unwrap();
    assert_eq!(views.len(), 1);

    let view = &views[0];
    assert_eq!(view.created_at.len(), 19);
    assert!(view.created_at.contains('T'));
    assert!(!view.created_at.contains('.'));

    // Views are JSON-ready for the UI
    let json = serde_json::to_value(view).unwrap();
    assert_eq!(json["emotion"], "interest");
    assert_eq!(json["score"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_clear_then_list_is_empty() {
    let (service, _temp) = create_test_service().await;

    for n in 0..5 {
        service
            .create_note(NoteDraft::new(format!("note {}", n), "joy"))
            .await
            .unwrap();
    }

    service.clear_notes().await.unwrap();
    assert!(service.list_notes(100, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_maintenance_can_rewrite_created_at() {
    let (service, _temp) = create_test_service().await;

    let note = service
        .create_note(NoteDraft::new("backdated", "guilt"))
        .await
        .unwrap();

    let backdated = note.created_at - chrono::Duration::days(3);
    let updated = service
        .update_note(
            note.id,
            NoteChanges {
                created_at: Some(backdated),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.created_at, backdated);
    assert_eq!(updated.text, "backdated");
    assert_eq!(updated.emotion, "guilt");
    assert!(updated.updated_at >= note.updated_at);
}

#[tokio::test]
async fn test_analytics_over_history() {
    let (service, _temp) = create_test_service().await;

    for (text, emotion) in [
        ("a good day", "joy"),
        ("another good one", "joy"),
        ("rough evening", "sadness"),
    ] {
        service
            .create_note(NoteDraft::new(text, emotion).with_source("text"))
            .await
            .unwrap();
        tick().await;
    }

    let notes = service.list_notes(10_000, 0).await.unwrap();
    let analytics = NoteAnalytics::from_notes(&notes);

    assert_eq!(analytics.total_entries, 3);
    assert_eq!(analytics.distinct_emotions, 2);
    assert_eq!(analytics.most_common_emotion.as_deref(), Some("joy"));
    assert_eq!(analytics.emotion_counts[0], ("joy".to_string(), 2));
    assert_eq!(analytics.daily_counts.iter().map(|d| d.count).sum::<usize>(), 3);
}

#[tokio::test]
async fn test_reopening_the_database_preserves_notes() {
    let temp_dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", temp_dir.path().join("diary.db").display());

    let id = {
        let pool = create_pool(&url).await.unwrap();
        let service = NotesService::new(NoteRepository::new(pool.clone()));
        let note = service
            .create_note(NoteDraft::new("persists", "surprise"))
            .await
            .unwrap();
        pool.close().await;
        note.id
    };

    let pool = create_pool(&url).await.unwrap();
    let service = NotesService::new(NoteRepository::new(pool));

    let note = service.get_note(id).await.unwrap().unwrap();
    assert_eq!(note.text, "persists");
    assert_eq!(note.emotion, "surprise");
}
