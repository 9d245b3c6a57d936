//! Bar/Time mapping
//!
//! Conversions between ticks, seconds and bar indices for a [`Score`]. All of
//! them are pure reads of the score's tempo map and cached bar boundaries.
//!
//! Every conversion rounds toward the containing segment or bar (floor) so
//! that `tick_to_bar(bar_to_tick(b)) == b` for every valid bar `b`.
//! Bars are numbered from 0.

use super::score::Score;
use super::tempo::{span_micros, TempoMap};

/// Slack for float error when a time lands exactly on a tick boundary.
const TICK_EPSILON: f64 = 1e-6;

impl TempoMap {
    pub fn tick_to_micros(&self, tick: u64) -> f64 {
        let segment = &self.segments()[self.segment_at_tick(tick)];
        segment.start_micros + span_micros(tick - segment.tick, segment.micros_per_quarter, self.ticks_per_quarter())
    }

    pub fn tick_to_seconds(&self, tick: u64) -> f64 {
        self.tick_to_micros(tick) / 1_000_000.0
    }

    /// Inverse of [`tick_to_seconds`](Self::tick_to_seconds), floored to a whole tick.
    /// Negative or non-finite times map to tick 0.
    pub fn seconds_to_tick(&self, seconds: f64) -> u64 {
        if !(seconds > 0.0) {
            return 0;
        }
        let micros = seconds * 1_000_000.0;
        let segment = &self.segments()[self.segment_at_micros(micros)];
        let ticks = (micros - segment.start_micros) * self.ticks_per_quarter() as f64
            / segment.micros_per_quarter as f64;
        if !ticks.is_finite() {
            return u64::MAX;
        }
        segment.tick + (ticks + TICK_EPSILON).floor().max(0.0) as u64
    }
}

impl Score {
    pub fn tick_to_seconds(&self, tick: u64) -> f64 {
        self.tempo_map.tick_to_seconds(tick)
    }

    pub fn seconds_to_tick(&self, seconds: f64) -> u64 {
        self.tempo_map.seconds_to_tick(seconds)
    }

    /// Number of bars, the final partial bar included. Always at least one.
    pub fn num_bars(&self) -> usize {
        self.bar_ticks.len() - 1
    }

    /// Start tick of `bar`. `bar == num_bars()` yields the end of the last bar;
    /// anything larger is clamped to it.
    pub fn bar_to_tick(&self, bar: usize) -> u64 {
        self.bar_ticks[bar.min(self.num_bars())]
    }

    /// Bar containing `tick`, clamped to the last bar.
    pub fn tick_to_bar(&self, tick: u64) -> usize {
        let containing = self.bar_ticks[..self.num_bars()]
            .partition_point(|&start| start <= tick)
            .saturating_sub(1);
        containing.min(self.num_bars() - 1)
    }

    /// Start time of `bar`, with the same clamping as [`bar_to_tick`](Self::bar_to_tick).
    pub fn bar_to_seconds(&self, bar: usize) -> f64 {
        self.bar_times[bar.min(self.num_bars())]
    }

    /// Bar containing `seconds`, clamped to `[0, num_bars - 1]`.
    ///
    /// Compares against the cached bar start times directly, so seeking to a
    /// bar's start time always reports that bar.
    pub fn seconds_to_bar(&self, seconds: f64) -> usize {
        let containing = self.bar_times[..self.num_bars()]
            .partition_point(|&start| start <= seconds)
            .saturating_sub(1);
        containing.min(self.num_bars() - 1)
    }
}
