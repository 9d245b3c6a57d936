//! Note trigger intents
//!
//! The transport never produces sound itself. It queues `Trigger`s which the
//! host drains after each call and hands to a synthesizer.

use crate::models::{NoteId, TimedNote};
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trigger {
    #[serde(rename_all = "camelCase")]
    NoteOn {
        id: NoteId,
        pitch: u8,
        velocity: u8,
        channel: u8,
        track: u16,
        /// Velocity scaled by the transport volume, 0.0 - 1.0
        gain: f32,
    },
    #[serde(rename_all = "camelCase")]
    NoteOff { id: NoteId, pitch: u8, channel: u8 },
}

impl Trigger {
    pub fn note_on(note: &TimedNote, volume: f32) -> Self {
        Trigger::NoteOn {
            id: note.id,
            pitch: note.note.pitch,
            velocity: note.note.velocity,
            channel: note.note.channel,
            track: note.note.track,
            gain: velocity_gain(note.note.velocity) * volume,
        }
    }

    pub fn note_off(note: &TimedNote) -> Self {
        Trigger::NoteOff {
            id: note.id,
            pitch: note.note.pitch,
            channel: note.note.channel,
        }
    }

    pub fn id(&self) -> NoteId {
        match *self {
            Trigger::NoteOn { id, .. } | Trigger::NoteOff { id, .. } => id,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, Trigger::NoteOn { .. })
    }
}

/// Linear velocity to gain, 127 -> 1.0
pub fn velocity_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    #[test]
    fn test_note_on_gain_scaled_by_volume() {
        let note = TimedNote {
            id: NoteId(7),
            note: Note::new(60, 127, 2, 1, 0, 480),
            start: 0.0,
            end: 0.5,
        };
        match Trigger::note_on(&note, 0.5) {
            Trigger::NoteOn { id, pitch, channel, track, gain, .. } => {
                assert_eq!(id, NoteId(7));
                assert_eq!(pitch, 60);
                assert_eq!(channel, 2);
                assert_eq!(track, 1);
                assert!((gain - 0.5).abs() < 1e-6);
            }
            other => panic!("expected note-on, got {:?}", other),
        }
        assert_eq!(Trigger::note_off(&note).id(), NoteId(7));
        assert!(!Trigger::note_off(&note).is_note_on());
    }

    #[test]
    fn test_trigger_json_shape() {
        let trigger = Trigger::NoteOff { id: NoteId(3), pitch: 64, channel: 0 };
        let json = serde_json::to_string(&trigger).unwrap();
        assert_eq!(json, r#"{"type":"noteOff","id":3,"pitch":64,"channel":0}"#);
    }
}
