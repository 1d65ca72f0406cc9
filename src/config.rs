//! Application configuration
//!
//! Central location for configuration constants, environment overrides,
//! and validation boundaries used throughout the application.

use std::path::PathBuf;

// ===== Audio Capture =====

/// Sample rate used for capture and transcription, in Hz.
/// The speech recognition service expects mono 16 kHz 16-bit PCM.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Number of channels captured from the microphone (mono)
pub const CAPTURE_CHANNELS: u16 = 1;

// ===== Schema Limits =====

/// Maximum stored length of an audio file path
pub const MAX_AUDIO_PATH_LEN: usize = 512;

/// Maximum stored length of an emotion label
pub const MAX_EMOTION_LEN: usize = 32;

/// Maximum stored length of a source tag
pub const MAX_SOURCE_LEN: usize = 16;

// ===== Repository Defaults =====

/// Default page size for note listings
pub const DEFAULT_LIST_LIMIT: i64 = 20;

// ===== Environment Variables =====

/// Connection string for the notes store
pub const DATABASE_URL_ENV: &str = "MOODNOTES_DATABASE_URL";
/// Directory holding the pretrained classifier files
pub const MODEL_DIR_ENV: &str = "MOODNOTES_MODEL_DIR";
/// Speech recognition endpoint override
pub const SPEECH_ENDPOINT_ENV: &str = "MOODNOTES_SPEECH_ENDPOINT";
/// API key passed to the speech recognition service
pub const SPEECH_API_KEY_ENV: &str = "MOODNOTES_SPEECH_API_KEY";
/// Language code sent with transcription requests
pub const SPEECH_LANGUAGE_ENV: &str = "MOODNOTES_SPEECH_LANGUAGE";
/// Directory where captured recordings are saved as WAV files
pub const RECORDINGS_DIR_ENV: &str = "MOODNOTES_RECORDINGS_DIR";

/// Runtime configuration resolved from the environment with local defaults
#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx connection string, e.g. `sqlite://diary.db`
    pub database_url: String,
    /// Directory containing `model.onnx`, `vocab.txt` and `config.json`
    pub model_dir: PathBuf,
    /// Speech recognition endpoint
    pub speech_endpoint: String,
    /// API key for the speech recognition service, if required
    pub speech_api_key: Option<String>,
    /// BCP-47 language code for transcription
    pub speech_language: String,
    /// Directory for persisted voice recordings
    pub recordings_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from environment variables, falling back to
    /// local file-backed defaults.
    pub fn from_env() -> Self {
        let database_url = std::env::var(DATABASE_URL_ENV)
            .unwrap_or_else(|_| "sqlite://diary.db".to_string());
        let model_dir = std::env::var(MODEL_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("emotion_model"));
        let speech_endpoint = std::env::var(SPEECH_ENDPOINT_ENV)
            .unwrap_or_else(|_| "https://www.google.com/speech-api/v2/recognize".to_string());
        let speech_api_key = std::env::var(SPEECH_API_KEY_ENV).ok();
        let speech_language =
            std::env::var(SPEECH_LANGUAGE_ENV).unwrap_or_else(|_| "ru-RU".to_string());
        let recordings_dir = std::env::var(RECORDINGS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("recordings"));

        Self {
            database_url,
            model_dir,
            speech_endpoint,
            speech_api_key,
            speech_language,
            recordings_dir,
        }
    }
}
