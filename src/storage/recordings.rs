//! Recording storage
//!
//! Persists captured audio buffers as mono 16 kHz WAV files so a note can
//! reference its source recording through `audio_path`.

use crate::config::{CAPTURE_CHANNELS, CAPTURE_SAMPLE_RATE};
use crate::error::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// File store for captured voice recordings
#[derive(Clone)]
pub struct RecordingStore {
    root: PathBuf,
}

impl RecordingStore {
    /// Create a new recording store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the store (create directory if needed)
    pub fn initialize(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        tracing::info!("Recording store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write a drained 16-bit buffer as a timestamped WAV file and return
    /// its path for the note's `audio_path` field.
    pub fn save(&self, samples: &[i16]) -> Result<PathBuf> {
        let filename = format!("rec-{}.wav", Utc::now().format("%Y%m%d-%H%M%S%.3f"));
        let path = self.root.join(filename);

        write_wav(&path, samples)?;

        tracing::debug!("Saved recording: {:?} ({} samples)", path, samples.len());
        Ok(path)
    }
}

fn write_wav(path: &Path, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: CAPTURE_CHANNELS,
        sample_rate: CAPTURE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(())
}
