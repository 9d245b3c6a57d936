//! Standard MIDI File builder shared by the integration tests
#![allow(dead_code)]

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

pub const TPQ: u16 = 480;

/// Events of one track at absolute ticks
#[derive(Default)]
pub struct TrackBuilder {
    events: Vec<(u32, u8, TrackEventKind<'static>)>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(mut self, channel: u8, key: u8, velocity: u8, start: u32, end: u32) -> Self {
        let on = MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(velocity) };
        let off = MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) };
        // Offs sort before ons at the same tick so back-to-back notes pair correctly
        self.events.push((start, 2, TrackEventKind::Midi { channel: u4::new(channel), message: on }));
        self.events.push((end, 1, TrackEventKind::Midi { channel: u4::new(channel), message: off }));
        self
    }

    /// Quarter-note beats: `note(key, beat, beats)` on channel 0
    pub fn beats(self, key: u8, beat: u32, beats: u32) -> Self {
        let tpq = TPQ as u32;
        self.note(0, key, 100, beat * tpq, (beat + beats) * tpq)
    }

    pub fn note_on_only(mut self, channel: u8, key: u8, tick: u32) -> Self {
        let on = MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(100) };
        self.events.push((tick, 2, TrackEventKind::Midi { channel: u4::new(channel), message: on }));
        self
    }

    pub fn tempo_bpm(mut self, tick: u32, bpm: f64) -> Self {
        let micros = (60_000_000.0 / bpm).round() as u32;
        self.events.push((tick, 0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros)))));
        self
    }

    /// `denominator` is the actual note value (4 for quarter notes)
    pub fn time_signature(mut self, tick: u32, numerator: u8, denominator: u8) -> Self {
        let power = denominator.trailing_zeros() as u8;
        self.events.push((tick, 0, TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, power, 24, 8))));
        self
    }

    /// Extra filler event so the track runs past its last note
    pub fn end_at(mut self, tick: u32) -> Self {
        self.events.push((tick, 3, TrackEventKind::Meta(MetaMessage::Marker(b"end"))));
        self
    }

    fn into_events(mut self) -> Vec<TrackEvent<'static>> {
        self.events.sort_by_key(|&(tick, order, _)| (tick, order));
        let mut last = 0;
        let mut track: Vec<TrackEvent<'static>> = self
            .events
            .into_iter()
            .map(|(tick, _, kind)| {
                let delta = tick - last;
                last = tick;
                TrackEvent { delta: u28::new(delta), kind }
            })
            .collect();
        track.push(TrackEvent { delta: u28::new(0), kind: TrackEventKind::Meta(MetaMessage::EndOfTrack) });
        track
    }
}

pub fn smf_bytes(format: Format, tracks: Vec<TrackBuilder>) -> Vec<u8> {
    let smf = Smf {
        header: Header::new(format, Timing::Metrical(u15::new(TPQ))),
        tracks: tracks.into_iter().map(TrackBuilder::into_events).collect(),
    };
    let mut bytes = Vec::new();
    smf.write(&mut bytes).expect("in-memory SMF write");
    bytes
}

/// Format 1 file, 120 BPM, 4/4, tempo and meter on a conductor track
pub fn parallel(tracks: Vec<TrackBuilder>) -> Vec<u8> {
    let mut all = vec![TrackBuilder::new().tempo_bpm(0, 120.0).time_signature(0, 4, 4)];
    all.extend(tracks);
    smf_bytes(Format::Parallel, all)
}
