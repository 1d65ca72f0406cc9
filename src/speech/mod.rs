//! Speech recognition
//!
//! Thin client over the external speech-to-text service.

pub mod transcriber;

pub use transcriber::SpeechTranscriber;
