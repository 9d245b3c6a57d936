//! Track event decoding and note pairing
//!
//! Each `MTrk` body is decoded with `midly`, converted from delta times to
//! absolute ticks and merged into one timeline ordered by tick, then by track
//! index, then by position in the track. Note-ons are paired with the nearest
//! following note-off (or zero-velocity note-on) on the same channel and pitch.

use crate::error::{ParseError, Result};
use crate::models::{Note, TempoChange, TimeSignature};
use midly::{EventIter, MetaMessage, MidiMessage, TrackEventKind};
use std::collections::HashMap;

/// The subset of track events the player cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8 },
    Tempo(u32),
    TimeSignature { numerator: u8, denominator: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub track: u16,
    pub kind: EventKind,
}

/// A decoded track: its relevant events and the tick of its final event.
#[derive(Debug, Clone, Default)]
pub struct TrackEvents {
    pub events: Vec<TimedEvent>,
    pub end_tick: u64,
}

/// Decode one `MTrk` body into absolute-tick events.
pub fn decode_track(track: u16, body: &[u8]) -> Result<TrackEvents> {
    let mut decoded = TrackEvents::default();
    let mut tick: u64 = 0;

    for event in EventIter::new(body) {
        let event = event.map_err(|e| ParseError::TruncatedChunk(format!("track {}: {}", track, e)))?;
        tick += event.delta.as_int() as u64;
        decoded.end_tick = tick;

        let kind = match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    // Zero velocity is a note-off by convention
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => EventKind::NoteOn {
                        channel,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        EventKind::NoteOff { channel, key: key.as_int() }
                    }
                    _ => continue,
                }
            }
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => EventKind::Tempo(tempo.as_int()),
            TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, denominator_power, _, _)) => {
                EventKind::TimeSignature {
                    numerator,
                    denominator: 1u16 << denominator_power.min(15),
                }
            }
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => break,
            _ => continue,
        };
        decoded.events.push(TimedEvent { tick, track, kind });
    }

    Ok(decoded)
}

/// Merge per-track event lists into one timeline.
///
/// Tracks are concatenated in index order and stably sorted by tick, so events
/// at equal ticks keep track order and, within a track, file order.
pub fn merge_tracks(tracks: &[TrackEvents]) -> Vec<TimedEvent> {
    let mut merged: Vec<TimedEvent> = tracks.iter().flat_map(|t| t.events.iter().copied()).collect();
    merged.sort_by_key(|e| e.tick);
    merged
}

/// Everything a score is built from.
#[derive(Debug, Clone, Default)]
pub struct ExtractedEvents {
    pub notes: Vec<Note>,
    pub tempos: Vec<TempoChange>,
    pub time_signatures: Vec<TimeSignature>,
}

struct OpenNote {
    track: u16,
    velocity: u8,
    start_tick: u64,
}

/// Pair notes and collect tempo/meter changes from a merged timeline.
///
/// A note-off closes every note still open on its channel and pitch. Notes
/// left open are closed at the final event tick of the track they started in.
pub fn extract(merged: &[TimedEvent], track_end_ticks: &[u64]) -> ExtractedEvents {
    let mut extracted = ExtractedEvents::default();
    let mut open: HashMap<(u8, u8), Vec<OpenNote>> = HashMap::new();

    for event in merged {
        match event.kind {
            EventKind::NoteOn { channel, key, velocity } => {
                open.entry((channel, key)).or_default().push(OpenNote {
                    track: event.track,
                    velocity,
                    start_tick: event.tick,
                });
            }
            EventKind::NoteOff { channel, key } => {
                if let Some(pending) = open.get_mut(&(channel, key)) {
                    for note in pending.drain(..) {
                        extracted
                            .notes
                            .push(Note::new(key, note.velocity, channel, note.track, note.start_tick, event.tick));
                    }
                }
            }
            EventKind::Tempo(micros_per_quarter) => extracted.tempos.push(TempoChange {
                tick: event.tick,
                micros_per_quarter,
            }),
            EventKind::TimeSignature { numerator, denominator } => {
                extracted.time_signatures.push(TimeSignature {
                    tick: event.tick,
                    numerator,
                    denominator,
                })
            }
        }
    }

    let mut unmatched = 0;
    for ((channel, key), pending) in open {
        for note in pending {
            unmatched += 1;
            let end = track_end_ticks.get(note.track as usize).copied().unwrap_or(note.start_tick);
            extracted
                .notes
                .push(Note::new(key, note.velocity, channel, note.track, note.start_tick, end));
        }
    }
    if unmatched > 0 {
        log::warn!("{} note-on events had no matching note-off; closed at end of track", unmatched);
    }

    extracted
}
