//! Speech-to-text over a remote recognition service
//!
//! Sends a mono 16 kHz 16-bit PCM buffer to the recognizer and returns the
//! recognized text. Both failure modes are recoverable: the caller may
//! retry or fall back to manual text entry.

use crate::config::CAPTURE_SAMPLE_RATE;
use crate::error::{AppError, Result};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

/// Client for the external speech recognition service
pub struct SpeechTranscriber {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    result: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternative: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl SpeechTranscriber {
    pub fn new(endpoint: String, language: String, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("moodnotes")
            .build()
            .map_err(|e| AppError::TranscriptionService(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            language,
            api_key,
        })
    }

    /// Recognize speech in a mono 16 kHz 16-bit buffer.
    ///
    /// Returns `SpeechNotRecognized` when the service could not extract
    /// speech and `TranscriptionService` when the call itself fails.
    pub async fn transcribe(&self, samples: &[i16]) -> Result<String> {
        if samples.is_empty() {
            return Err(AppError::SpeechNotRecognized);
        }

        tracing::debug!(
            "Transcribing {} samples ({:.1}s of audio)",
            samples.len(),
            samples.len() as f64 / CAPTURE_SAMPLE_RATE as f64
        );

        let body: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let mut query: Vec<(&str, &str)> =
            vec![("client", "chromium"), ("lang", &self.language)];
        if let Some(key) = &self.api_key {
            query.push(("key", key));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&query)
            .header(
                CONTENT_TYPE,
                format!("audio/l16; rate={}", CAPTURE_SAMPLE_RATE),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::TranscriptionService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::TranscriptionService(format!(
                "recognizer returned status {}",
                status
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::TranscriptionService(e.to_string()))?;

        parse_transcript(&raw)
    }
}

/// The recognizer streams one JSON object per line; the first lines are
/// often empty results. Pick the first non-empty transcript.
fn parse_transcript(raw: &str) -> Result<String> {
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let parsed: RecognitionResponse = match serde_json::from_str(line) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };

        for result in parsed.result {
            if let Some(alternative) = result.alternative.first() {
                let transcript = alternative.transcript.trim();
                if !transcript.is_empty() {
                    if let Some(confidence) = alternative.confidence {
                        tracing::debug!("Recognized with confidence {:.3}", confidence);
                    }
                    return Ok(transcript.to_string());
                }
            }
        }
    }

    Err(AppError::SpeechNotRecognized)
}
