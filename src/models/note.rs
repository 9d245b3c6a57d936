//! Note data produced by the parser
//!
//! Notes are immutable once parsed. A [`Score`](super::Score) stores them sorted
//! by start time together with their wall-clock span as [`TimedNote`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a note inside its score's start-time-sorted note list.
///
/// Ids are only meaningful for the score that issued them; loading a new
/// score invalidates every outstanding id.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub u32);

impl NoteId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A paired note-on/note-off in ticks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub pitch: u8,      // MIDI note number 0-127
    pub velocity: u8,   // Note-on velocity 1-127
    pub channel: u8,    // MIDI channel 0-15
    pub track: u16,     // Index of the MTrk chunk the note-on came from
    pub start_tick: u64,
    pub end_tick: u64,  // Always >= start_tick
}

impl Note {
    pub fn new(pitch: u8, velocity: u8, channel: u8, track: u16, start_tick: u64, end_tick: u64) -> Self {
        Self {
            pitch: pitch.min(127),
            velocity: velocity.min(127),
            channel: channel & 0x0F,
            track,
            start_tick,
            end_tick: end_tick.max(start_tick),
        }
    }

    pub fn duration_ticks(&self) -> u64 {
        self.end_tick - self.start_tick
    }

    /// Scientific pitch name, e.g. 60 -> "C4"
    pub fn pitch_name(&self) -> String {
        const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
        let octave = self.pitch as i32 / 12 - 1;
        format!("{}{}", NAMES[(self.pitch % 12) as usize], octave)
    }
}

/// A note placed on the wall clock.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TimedNote {
    pub id: NoteId,
    pub note: Note,
    /// Seconds from the start of the score
    pub start: f64,
    pub end: f64,
}

impl TimedNote {
    /// Whether `time` lies in the half-open interval `[start, end)`.
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }

    #[inline]
    pub fn overlaps(&self, from: f64, to: f64) -> bool {
        self.start < to && self.end > from
    }
}

impl fmt::Debug for TimedNote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TimedNote {{ id: {}, key: {}, start: {:.3}, end: {:.3}, velocity: {}, track: {} }}",
            self.id.0,
            self.note.pitch_name(),
            self.start,
            self.end,
            self.note.velocity,
            self.note.track
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_end_never_before_start() {
        let note = Note::new(60, 100, 0, 0, 480, 240);
        assert_eq!(note.end_tick, 480);
        assert_eq!(note.duration_ticks(), 0);
    }

    #[test]
    fn test_pitch_name() {
        assert_eq!(Note::new(60, 1, 0, 0, 0, 1).pitch_name(), "C4");
        assert_eq!(Note::new(21, 1, 0, 0, 0, 1).pitch_name(), "A0");
        assert_eq!(Note::new(61, 1, 0, 0, 0, 1).pitch_name(), "C#4");
    }

    #[test]
    fn test_timed_note_interval_is_half_open() {
        let timed = TimedNote {
            id: NoteId(0),
            note: Note::new(60, 100, 0, 0, 0, 480),
            start: 1.0,
            end: 2.0,
        };
        assert!(timed.contains(1.0));
        assert!(timed.contains(1.5));
        assert!(!timed.contains(2.0));
        assert!(timed.overlaps(1.9, 3.0));
        assert!(!timed.overlaps(2.0, 3.0));
    }
}
