//! Playback transport
//!
//! The transport owns the playback clock and everything that mutates with it:
//! play state, loop region, volume, display range, the set of sounding notes
//! and load coordination. The score itself is shared read-only as an
//! `Rc<Score>` and only ever replaced as a whole.
//!
//! # Frame contract
//!
//! ```text
//! host frame:  tick(dt) → take_triggers() → render(snapshot)
//! load:        begin_load() ... (bytes arrive, parse) ... finish_load(ticket, result)
//! ```
//!
//! Between `begin_load` and the matching `finish_load`, `tick` returns
//! [`TickStatus::Deferred`] without moving time and the renderer keeps seeing
//! the previous score. The swap is the last step of `finish_load`.

use super::state::{LoadTicket, LoopRegion, PlayState, TickStatus, TransportSnapshot};
use super::trigger::Trigger;
use crate::config::{defaults, PlayerConfig};
use crate::error::{LoadOutcome, ParseError};
use crate::models::{NoteId, Score, TimedNote};
use crate::parse::parse_smf;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug)]
pub struct Transport {
    score: Option<Rc<Score>>,
    state: PlayState,
    current_time: f64,
    volume: f32,
    display_range: f64,
    /// Requested loop bars, kept so the region can be re-derived for a new score
    loop_bars: Option<(usize, usize)>,
    loop_region: Option<LoopRegion>,
    sounding: BTreeSet<NoteId>,
    load_pending: bool,
    /// Generation of the newest load issued
    load_generation: u64,
    triggers: Vec<Trigger>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

impl Transport {
    pub fn new(config: &PlayerConfig) -> Self {
        let mut transport = Self {
            score: None,
            state: PlayState::Stopped,
            current_time: 0.0,
            volume: defaults::VOLUME,
            display_range: defaults::DISPLAY_RANGE_SECS,
            loop_bars: None,
            loop_region: None,
            sounding: BTreeSet::new(),
            load_pending: false,
            load_generation: 0,
            triggers: Vec::new(),
        };
        transport.set_volume(config.volume);
        transport.set_display_range(config.display_range_secs);
        transport
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True once a score with at least one note has been loaded.
    pub fn ready(&self) -> bool {
        self.score.as_ref().map_or(false, |s| !s.notes().is_empty())
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn load_pending(&self) -> bool {
        self.load_pending
    }

    pub fn score(&self) -> Option<&Rc<Score>> {
        self.score.as_ref()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.score.as_ref().map_or(0.0, |s| s.duration())
    }

    pub fn current_bar(&self) -> usize {
        self.score.as_ref().map_or(0, |s| s.seconds_to_bar(self.current_time))
    }

    pub fn num_bars(&self) -> usize {
        self.score.as_ref().map_or(0, |s| s.num_bars())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn display_range(&self) -> f64 {
        self.display_range
    }

    pub fn loop_region(&self) -> Option<LoopRegion> {
        self.loop_region
    }

    pub fn sounding(&self) -> &BTreeSet<NoteId> {
        &self.sounding
    }

    pub fn snapshot(&self) -> TransportSnapshot<'_> {
        TransportSnapshot {
            current_time: self.current_time,
            display_range: self.display_range,
            playing: self.is_playing(),
            loop_region: self.loop_region,
            sounding: &self.sounding,
        }
    }

    /// Hand over every trigger queued since the last call.
    pub fn take_triggers(&mut self) -> Vec<Trigger> {
        std::mem::take(&mut self.triggers)
    }

    // ========================================================================
    // Play state
    // ========================================================================

    /// Stopped → Playing. No-op while playing or before a score is loaded.
    ///
    /// Notes already held at the current time are attacked, so resuming
    /// mid-note or after a seek while stopped sounds them.
    pub fn play(&mut self) {
        if !self.ready() || self.is_playing() {
            return;
        }
        let Some(score) = self.score.clone() else {
            return;
        };
        log::debug!("play from {:.3}s", self.current_time);
        self.state = PlayState::Playing;
        self.attack(score.notes_at(self.current_time), self.current_time);
    }

    /// Playing → Stopped. Always silences every sounding note.
    pub fn stop(&mut self) {
        if self.is_playing() {
            log::debug!("stop at {:.3}s", self.current_time);
        }
        self.state = PlayState::Stopped;
        self.release_all();
    }

    /// Advance the clock by `delta_seconds` and queue the resulting triggers.
    pub fn tick(&mut self, delta_seconds: f64) -> TickStatus {
        if self.load_pending {
            return TickStatus::Deferred;
        }
        if !self.is_playing() {
            return TickStatus::Idle;
        }
        let Some(score) = self.score.clone() else {
            return TickStatus::Idle;
        };

        let delta = if delta_seconds.is_finite() { delta_seconds.max(0.0) } else { 0.0 };
        let from = self.current_time;
        let mut to = from + delta;

        let status = match self.loop_region {
            Some(region) if to >= region.end_time => {
                // Keep the sub-frame remainder so the wrap is seamless. A clock
                // already past the loop end (after a seek) wraps as well.
                to = region.start_time + (to - region.end_time) % region.len();
                self.attack(score.notes_starting_in(from, region.end_time), region.end_time);
                self.release_all();
                self.attack(score.notes_starting_through(region.start_time, to), to);
                // Notes spanning the loop start resume as well
                self.attack(score.notes_at(to), to);
                TickStatus::Looped
            }
            Some(_) => {
                self.advance(&score, from, to);
                TickStatus::Advanced
            }
            None if to >= score.duration() => {
                to = score.duration().max(from);
                self.advance(&score, from, to);
                TickStatus::Finished
            }
            None => {
                self.advance(&score, from, to);
                TickStatus::Advanced
            }
        };
        self.current_time = to;

        if status == TickStatus::Finished {
            log::debug!("reached end of score at {:.3}s", to);
            self.state = PlayState::Stopped;
            self.release_all();
        }
        status
    }

    /// Move continuously from `from` to `to`: attack notes starting in
    /// `[from, to]`, then release sounding notes that no longer contain `to`.
    fn advance(&mut self, score: &Score, from: f64, to: f64) {
        self.attack(score.notes_starting_through(from, to), to);

        let ended: Vec<NoteId> = self
            .sounding
            .iter()
            .copied()
            .filter(|&id| score.note(id).map_or(true, |n| !n.contains(to)))
            .collect();
        for id in ended {
            self.release(score, id);
        }
    }

    /// Attack every note not already sounding. A note that no longer contains
    /// `at` started and ended within this frame and is released immediately.
    fn attack<'a>(&mut self, notes: impl IntoIterator<Item = &'a TimedNote>, at: f64) {
        for note in notes {
            if note.end <= note.start || self.sounding.contains(&note.id) {
                continue;
            }
            self.triggers.push(Trigger::note_on(note, self.volume));
            if note.contains(at) {
                self.sounding.insert(note.id);
            } else {
                self.triggers.push(Trigger::note_off(note));
            }
        }
    }

    // ========================================================================
    // Seeking
    // ========================================================================

    /// Jump to `time`, clamped to `[0, duration]`.
    ///
    /// While stopped only the clock moves; the notes containing the new time
    /// are attacked by the next [`play`](Self::play).
    ///
    /// While playing, the sounding set is rebuilt to exactly the notes
    /// containing the new time. With `clear_sounds` every previously sounding
    /// note is released and the new set attacked afresh (discrete jumps);
    /// without it notes that still contain the new time keep ringing
    /// untouched (continuous scrubbing).
    pub fn seek_time(&mut self, time: f64, clear_sounds: bool) {
        let Some(score) = self.score.clone() else {
            return;
        };
        let time = if time.is_nan() { 0.0 } else { time.clamp(0.0, score.duration()) };

        if self.is_playing() {
            let now: BTreeSet<NoteId> = score.notes_at(time).map(|n| n.id).collect();
            if clear_sounds {
                self.release_all();
            }
            let ended: Vec<NoteId> = self.sounding.difference(&now).copied().collect();
            for id in ended {
                self.release(&score, id);
            }
            for id in now {
                if self.sounding.insert(id) {
                    if let Some(note) = score.note(id) {
                        self.triggers.push(Trigger::note_on(note, self.volume));
                    }
                }
            }
        }

        self.current_time = time;
    }

    /// Jump to the start of `bar`, clamped to the last bar.
    pub fn seek_bar(&mut self, bar: usize, clear_sounds: bool) {
        let Some(score) = self.score.clone() else {
            return;
        };
        let bar = bar.min(score.num_bars() - 1);
        log::debug!("seek to bar {}", bar);
        self.seek_time(score.bar_to_seconds(bar), clear_sounds);
    }

    /// Move relative to the current time, as a continuous scrub.
    pub fn skip(&mut self, delta_seconds: f64) {
        if delta_seconds.is_finite() {
            self.seek_time(self.current_time + delta_seconds, false);
        }
    }

    // ========================================================================
    // Loop, volume, display range
    // ========================================================================

    /// Loop bars `[start_bar, end_bar)`. Equal bars disable the loop; values are
    /// clamped to `[0, num_bars]` and re-ordered if reversed.
    pub fn set_loop_bars(&mut self, start_bar: usize, end_bar: usize) {
        if !self.ready() {
            return;
        }
        self.loop_bars = if start_bar == end_bar { None } else { Some((start_bar, end_bar)) };
        self.refresh_loop_region();
        match self.loop_region {
            Some(region) => log::debug!(
                "loop bars {}..{} ({:.3}s - {:.3}s)",
                region.start_bar,
                region.end_bar,
                region.start_time,
                region.end_time
            ),
            None => log::debug!("loop disabled"),
        }
    }

    pub fn clear_loop(&mut self) {
        self.loop_bars = None;
        self.loop_region = None;
    }

    /// Convert the requested loop bars to times for the current score.
    fn refresh_loop_region(&mut self) {
        self.loop_region = match (self.loop_bars, self.score.as_ref()) {
            (Some((a, b)), Some(score)) => {
                let bars = score.num_bars();
                let (start_bar, end_bar) = (a.min(b).min(bars), a.max(b).min(bars));
                (start_bar < end_bar).then(|| LoopRegion {
                    start_bar,
                    end_bar,
                    start_time: score.bar_to_seconds(start_bar),
                    end_time: score.bar_to_seconds(end_bar),
                })
            }
            _ => None,
        };
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Seconds of timeline shown per frame. Non-positive values are ignored.
    pub fn set_display_range(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.display_range = seconds;
        } else {
            log::warn!("ignoring display range {}", seconds);
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Install a parsed score immediately, superseding any load in flight.
    pub fn load(&mut self, score: Score) {
        self.load_generation += 1;
        self.load_pending = true;
        self.commit(score);
        self.load_pending = false;
    }

    /// Start an asynchronous load. Ticks are deferred until the newest ticket finishes.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.load_pending = true;
        log::debug!("load #{} started", self.load_generation);
        LoadTicket { generation: self.load_generation }
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// A ticket older than the newest one is discarded whatever its result.
    /// A failed parse leaves the current score untouched.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Score, ParseError>,
    ) -> Result<LoadOutcome, ParseError> {
        if ticket.generation != self.load_generation {
            log::info!(
                "load #{} superseded by #{}, discarding its result",
                ticket.generation,
                self.load_generation
            );
            return Ok(LoadOutcome::Superseded);
        }

        self.load_pending = false;
        match result {
            Ok(score) => {
                self.commit(score);
                log::info!("load #{} committed", ticket.generation);
                Ok(LoadOutcome::Committed)
            }
            Err(e) => {
                log::warn!("load #{} failed: {}", ticket.generation, e);
                Err(e)
            }
        }
    }

    /// Abandon a load whose bytes never arrived. Returns false for a stale ticket.
    pub fn cancel_load(&mut self, ticket: LoadTicket) -> bool {
        if ticket.generation != self.load_generation || !self.load_pending {
            return false;
        }
        self.load_pending = false;
        log::warn!("load #{} cancelled", ticket.generation);
        true
    }

    /// Parse and install `bytes` in one step.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        let ticket = self.begin_load();
        self.finish_load(ticket, parse_smf(bytes)).map(|_| ())
    }

    /// Reset playback state, then swap the score in as the final step.
    fn commit(&mut self, score: Score) {
        self.release_all();
        self.state = PlayState::Stopped;
        self.current_time = 0.0;
        self.score = Some(Rc::new(score));
        self.refresh_loop_region();
    }

    // ========================================================================
    // Sounding set
    // ========================================================================

    fn release(&mut self, score: &Score, id: NoteId) {
        if self.sounding.remove(&id) {
            if let Some(note) = score.note(id) {
                self.triggers.push(Trigger::note_off(note));
            }
        }
    }

    fn release_all(&mut self) {
        let Some(score) = self.score.clone() else {
            self.sounding.clear();
            return;
        };
        for id in std::mem::take(&mut self.sounding) {
            if let Some(note) = score.note(id) {
                self.triggers.push(Trigger::note_off(note));
            }
        }
    }
}
