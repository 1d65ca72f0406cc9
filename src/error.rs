//! Error types for the moodnotes crate
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a UI shell.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Recording is already in progress")]
    AlreadyRecording,

    #[error("No recording is in progress")]
    NotRecording,

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Speech could not be recognized")]
    SpeechNotRecognized,

    #[error("Transcription service error: {0}")]
    TranscriptionService(String),

    #[error("Failed to load emotion classifier: {0}")]
    ClassifierLoad(String),

    #[error("Emotion classification failed: {0}")]
    Classifier(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
