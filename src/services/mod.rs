//! Services module
//!
//! Business logic services that coordinate between the session layer and
//! the repository.

pub mod analytics;
pub mod notes;

pub use analytics::NoteAnalytics;
pub use notes::NotesService;
