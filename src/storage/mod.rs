//! Storage module
//!
//! On-disk persistence for captured voice recordings.

pub mod recordings;

pub use recordings::RecordingStore;
