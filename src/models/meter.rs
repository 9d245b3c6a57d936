//! Time signature map and bar boundaries

use crate::config::defaults;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub tick: u64,
    pub numerator: u8,
    /// Actual note value (4 = quarter), not the SMF power-of-two exponent
    pub denominator: u16,
}

impl TimeSignature {
    /// Ticks in one bar: `numerator * (tpq * 4 / denominator)`, at least one.
    pub fn ticks_per_bar(&self, ticks_per_quarter: u16) -> u64 {
        let beat = ticks_per_quarter as u64 * 4 / self.denominator.max(1) as u64;
        (self.numerator as u64 * beat).max(1)
    }
}

/// Strictly increasing by tick, first entry at tick 0, never empty.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TimeSignatureMap {
    entries: Vec<TimeSignature>,
}

impl TimeSignatureMap {
    /// Same normalisation as the tempo map: last change per tick wins, 4/4 is
    /// assumed before the first change, zero numerators are ignored.
    pub fn new(changes: &[TimeSignature]) -> Self {
        let mut sorted: Vec<TimeSignature> = changes
            .iter()
            .copied()
            .filter(|c| c.numerator > 0 && c.denominator > 0)
            .collect();
        sorted.sort_by_key(|c| c.tick);

        let mut entries: Vec<TimeSignature> = Vec::with_capacity(sorted.len() + 1);
        for change in sorted {
            match entries.last_mut() {
                Some(last) if last.tick == change.tick => *last = change,
                _ => entries.push(change),
            }
        }
        if entries.first().map_or(true, |c| c.tick != 0) {
            let (numerator, denominator) = defaults::TIME_SIGNATURE;
            entries.insert(0, TimeSignature { tick: 0, numerator, denominator: denominator as u16 });
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[TimeSignature] {
        &self.entries
    }

    /// Signature in effect at `tick`.
    pub fn at(&self, tick: u64) -> &TimeSignature {
        let idx = self.entries.partition_point(|e| e.tick <= tick).saturating_sub(1);
        &self.entries[idx]
    }

    /// Bar boundaries covering `[0, end_tick)`.
    ///
    /// Returns `n + 1` ticks for `n` bars: the start of every bar followed by
    /// the end of the last one. Bars accumulate within a signature segment; a
    /// signature change always starts a fresh bar, truncating the bar in
    /// progress. There is always at least one bar.
    pub fn bar_boundaries(&self, ticks_per_quarter: u16, end_tick: u64) -> Vec<u64> {
        let mut boundaries = Vec::new();
        let mut closing = 0;

        'segments: for (i, sig) in self.entries.iter().enumerate() {
            let segment_end = self.entries.get(i + 1).map_or(u64::MAX, |next| next.tick);
            let bar_len = sig.ticks_per_bar(ticks_per_quarter);
            let mut tick = sig.tick;
            while tick < segment_end {
                if tick >= end_tick && !boundaries.is_empty() {
                    break 'segments;
                }
                boundaries.push(tick);
                tick = tick.saturating_add(bar_len);
                closing = tick.min(segment_end);
            }
        }

        boundaries.push(closing);
        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(tick: u64, numerator: u8, denominator: u16) -> TimeSignature {
        TimeSignature { tick, numerator, denominator }
    }

    #[test]
    fn test_ticks_per_bar() {
        assert_eq!(sig(0, 4, 4).ticks_per_bar(480), 1920);
        assert_eq!(sig(0, 3, 4).ticks_per_bar(480), 1440);
        assert_eq!(sig(0, 6, 8).ticks_per_bar(480), 1440);
        assert_eq!(sig(0, 2, 2).ticks_per_bar(480), 1920);
    }

    #[test]
    fn test_default_meter() {
        let map = TimeSignatureMap::new(&[]);
        assert_eq!(map.entries(), &[sig(0, 4, 4)]);
    }

    #[test]
    fn test_boundaries_cover_end_tick() {
        let map = TimeSignatureMap::new(&[]);
        // 3.5 bars of 4/4 at 480 tpq
        assert_eq!(map.bar_boundaries(480, 6720), vec![0, 1920, 3840, 5760, 7680]);
        // Exactly four bars
        assert_eq!(map.bar_boundaries(480, 7680), vec![0, 1920, 3840, 5760, 7680]);
    }

    #[test]
    fn test_empty_score_has_one_bar() {
        let map = TimeSignatureMap::new(&[]);
        assert_eq!(map.bar_boundaries(480, 0), vec![0, 1920]);
    }

    #[test]
    fn test_signature_change_starts_new_bar() {
        // 4/4 for one and a half bars, then 3/4
        let map = TimeSignatureMap::new(&[sig(0, 4, 4), sig(2880, 3, 4)]);
        assert_eq!(map.bar_boundaries(480, 5000), vec![0, 1920, 2880, 4320, 5760]);
        assert_eq!(map.at(3000).numerator, 3);
        assert_eq!(map.at(100).numerator, 4);
    }
}
