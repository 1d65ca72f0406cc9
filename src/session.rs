//! Session context and initialization
//!
//! One `SessionContext` per UI session replaces the implicit global state
//! of a typical journaling front end: the live recorder, the cached
//! classifier and transcriber, and the id of the note being edited all
//! live here with explicit lifetimes. Handlers below are what a
//! presentation shell wires its actions to.

use crate::audio::VoiceRecorder;
use crate::config::{Config, DEFAULT_LIST_LIMIT};
use crate::database::{create_pool, Note, NoteChanges, NoteDraft, NoteRepository, NoteView};
use crate::emotion::EmotionDetector;
use crate::error::{AppError, Result};
use crate::services::{NoteAnalytics, NotesService};
use crate::speech::SpeechTranscriber;
use crate::storage::RecordingStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging. The embedding shell calls this once on startup.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodnotes=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Result of a completed voice recording
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub audio_path: PathBuf,
}

/// Per-session state: services, adapters, and the editing target
pub struct SessionContext {
    notes: NotesService,
    detector: EmotionDetector,
    recorder: VoiceRecorder,
    transcriber: SpeechTranscriber,
    recordings: RecordingStore,
    editing_note_id: Option<i64>,
}

impl SessionContext {
    /// Initialize every collaborator for one session.
    ///
    /// The classifier loads first: missing model files abort startup
    /// instead of failing on the first entry.
    pub async fn initialize(config: &Config) -> Result<Self> {
        tracing::info!("Initializing session");

        let detector = EmotionDetector::load(&config.model_dir)?;

        let pool = create_pool(&config.database_url).await?;
        let notes = NotesService::new(NoteRepository::new(pool));

        let transcriber = SpeechTranscriber::new(
            config.speech_endpoint.clone(),
            config.speech_language.clone(),
            config.speech_api_key.clone(),
        )?;

        let recordings = RecordingStore::new(config.recordings_dir.clone());
        recordings.initialize()?;

        tracing::info!("Session initialized successfully");

        Ok(Self {
            notes,
            detector,
            recorder: VoiceRecorder::new(),
            transcriber,
            recordings,
            editing_note_id: None,
        })
    }

    pub fn notes(&self) -> &NotesService {
        &self.notes
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn editing_note_id(&self) -> Option<i64> {
        self.editing_note_id
    }

    /// Classify and store a typed entry
    pub async fn submit_text_entry(&mut self, text: &str) -> Result<Note> {
        let emotion = self.detector.classify(text)?;
        self.notes
            .create_note(NoteDraft::new(text, emotion).with_source("text"))
            .await
    }

    /// Begin capturing from the microphone
    pub fn start_recording(&mut self) -> Result<()> {
        self.recorder.start()
    }

    /// Stop capturing, persist the recording, and transcribe it.
    ///
    /// `Ok(None)` means no audio arrived between start and stop.
    /// Recognition and service failures are recoverable; the caller may
    /// retry or fall back to manual text entry.
    pub async fn finish_recording(&mut self) -> Result<Option<Transcription>> {
        self.recorder.stop()?;

        let Some(buffer) = self.recorder.drain() else {
            tracing::warn!("Recording produced no audio data");
            return Ok(None);
        };

        let audio_path = self.recordings.save(&buffer)?;
        let text = self.transcriber.transcribe(&buffer).await?;

        Ok(Some(Transcription { text, audio_path }))
    }

    /// Classify and store a transcribed (possibly user-corrected) entry
    pub async fn submit_voice_entry(
        &mut self,
        text: &str,
        audio_path: Option<&Path>,
    ) -> Result<Note> {
        let emotion = self.detector.classify(text)?;

        let mut draft = NoteDraft::new(text, emotion);
        if let Some(path) = audio_path {
            draft = draft.with_audio_path(path.to_string_lossy());
        }

        self.notes.create_note(draft).await
    }

    /// Mark a note as the editing target
    pub fn begin_edit(&mut self, id: i64) {
        self.editing_note_id = Some(id);
    }

    pub fn cancel_edit(&mut self) {
        self.editing_note_id = None;
    }

    /// Re-classify the edited text and update the targeted note.
    /// Returns `None` when the note disappeared underneath the edit.
    pub async fn save_edit(&mut self, text: &str) -> Result<Option<Note>> {
        let id = self
            .editing_note_id
            .ok_or_else(|| AppError::Generic("no note is being edited".to_string()))?;

        let emotion = self.detector.classify(text)?;
        let changes = NoteChanges {
            text: Some(text.to_string()),
            emotion: Some(emotion),
            ..Default::default()
        };

        let updated = self.notes.update_note(id, changes).await?;
        self.editing_note_id = None;
        Ok(updated)
    }

    /// Delete an entry, clearing the editing target if it matches
    pub async fn delete_entry(&mut self, id: i64) -> Result<()> {
        if self.editing_note_id == Some(id) {
            self.editing_note_id = None;
        }
        self.notes.delete_note(id).await
    }

    /// Serialized history for the entry list
    pub async fn entries(&self, limit: i64) -> Result<Vec<NoteView>> {
        self.notes.list_note_views(limit, 0).await
    }

    /// Serialized history with the default page size
    pub async fn recent_entries(&self) -> Result<Vec<NoteView>> {
        self.entries(DEFAULT_LIST_LIMIT).await
    }

    /// Aggregate statistics over up to `limit` notes
    pub async fn analytics(&self, limit: i64) -> Result<NoteAnalytics> {
        let notes = self.notes.list_notes(limit, 0).await?;
        Ok(NoteAnalytics::from_notes(&notes))
    }
}
