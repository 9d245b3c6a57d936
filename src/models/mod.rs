//! Score model
//!
//! Data produced by parsing a Standard MIDI File: tempo map, time-signature
//! map and notes, plus the derived bar boundaries. Everything in here is
//! immutable once a [`Score`] has been built.

pub mod meter;
pub mod note;
pub mod score;
pub mod tempo;
pub mod timeline;

// Re-export commonly used types
pub use meter::{TimeSignature, TimeSignatureMap};
pub use note::{Note, NoteId, TimedNote};
pub use score::Score;
pub use tempo::{TempoChange, TempoMap, TempoSegment};
