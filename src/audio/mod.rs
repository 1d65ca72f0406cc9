//! Audio capture
//!
//! Microphone recording into an in-memory frame queue, drained into a
//! single 16-bit buffer for transcription.

pub mod recorder;

pub use recorder::{FrameProducer, FrameQueue, VoiceRecorder};
