//! Tempo map: piecewise-linear tick -> microsecond function

use crate::config::defaults;
use serde::Serialize;

/// A tempo change in effect from `tick` onwards.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct TempoChange {
    pub tick: u64,
    pub micros_per_quarter: u32,
}

/// One linear piece of the tick -> time function.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct TempoSegment {
    pub tick: u64,
    pub micros_per_quarter: u32,
    /// Microseconds elapsed at `tick`
    pub start_micros: f64,
}

/// Strictly increasing by tick, first entry at tick 0, never empty.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TempoMap {
    ticks_per_quarter: u16,
    segments: Vec<TempoSegment>,
}

impl TempoMap {
    /// Build a map from tempo changes in any order.
    ///
    /// Changes sharing a tick keep the last one given; a missing tick-0 entry is
    /// filled with 120 BPM; zero tempos are ignored.
    pub fn new(ticks_per_quarter: u16, changes: &[TempoChange]) -> Self {
        let ticks_per_quarter = ticks_per_quarter.max(1);

        let mut sorted: Vec<TempoChange> = changes
            .iter()
            .copied()
            .filter(|c| c.micros_per_quarter > 0)
            .collect();
        // Stable sort keeps file order among equal ticks
        sorted.sort_by_key(|c| c.tick);

        let mut entries: Vec<TempoChange> = Vec::with_capacity(sorted.len() + 1);
        for change in sorted {
            match entries.last_mut() {
                Some(last) if last.tick == change.tick => *last = change,
                _ => entries.push(change),
            }
        }
        if entries.first().map_or(true, |c| c.tick != 0) {
            entries.insert(0, TempoChange { tick: 0, micros_per_quarter: defaults::MICROS_PER_QUARTER });
        }
        // Drop changes that do not change anything
        entries.dedup_by(|next, prev| next.micros_per_quarter == prev.micros_per_quarter);

        let mut segments = Vec::with_capacity(entries.len());
        let mut elapsed = 0.0;
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                let prev = entries[i - 1];
                elapsed += span_micros(entry.tick - prev.tick, prev.micros_per_quarter, ticks_per_quarter);
            }
            segments.push(TempoSegment {
                tick: entry.tick,
                micros_per_quarter: entry.micros_per_quarter,
                start_micros: elapsed,
            });
        }

        Self { ticks_per_quarter, segments }
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn segments(&self) -> &[TempoSegment] {
        &self.segments
    }

    /// Index of the segment in effect at `tick`.
    pub(crate) fn segment_at_tick(&self, tick: u64) -> usize {
        self.segments.partition_point(|s| s.tick <= tick).saturating_sub(1)
    }

    /// Index of the segment whose time range contains `micros`.
    pub(crate) fn segment_at_micros(&self, micros: f64) -> usize {
        self.segments.partition_point(|s| s.start_micros <= micros).saturating_sub(1)
    }
}

/// Microseconds covered by `ticks` at a constant tempo.
#[inline]
pub(crate) fn span_micros(ticks: u64, micros_per_quarter: u32, ticks_per_quarter: u16) -> f64 {
    ticks as f64 * micros_per_quarter as f64 / ticks_per_quarter as f64
}
