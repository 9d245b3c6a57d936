//! Keyboard geometry
//!
//! Maps MIDI keys to horizontal spans. Every octave has the same width; within
//! an octave each key occupies a fixed fraction, with black keys overlapping
//! the white keys they sit between.

use super::surface::Rect;

/// `[left, right)` of each pitch class as a fraction of one octave, C first.
const OCTAVE_SPANS: [(f64, f64); 12] = [
    (0.0, 0.1428),
    (0.0951, 0.1666),
    (0.1428, 0.2857),
    (0.2618, 0.3333),
    (0.2857, 0.4285),
    (0.4285, 0.5714),
    (0.5237, 0.5952),
    (0.5714, 0.7142),
    (0.6784, 0.7499),
    (0.7142, 0.8571),
    (0.8332, 0.9047),
    (0.8571, 1.0),
];

pub fn is_black_key(key: u8) -> bool {
    matches!(key % 12, 1 | 3 | 6 | 8 | 10)
}

/// Horizontal span of one key
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeySpan {
    pub key: u8,
    pub left: f64,
    pub width: f64,
}

impl KeySpan {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn is_black(&self) -> bool {
        is_black_key(self.key)
    }

    pub fn is_octave_start(&self) -> bool {
        self.key % 12 == 0
    }
}

/// Key spans for `min_key..=max_key` laid across a viewport width.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    min_key: u8,
    spans: Vec<KeySpan>,
}

impl KeyboardLayout {
    pub fn new(min_key: u8, max_key: u8, viewport: Rect) -> Self {
        let (min_key, max_key) = (min_key.min(max_key).min(127), max_key.max(min_key).min(127));
        let first = OCTAVE_SPANS[(min_key % 12) as usize];
        let last = OCTAVE_SPANS[(max_key % 12) as usize];

        // Octave-aligned anchors: the C above min_key and the C at or below max_key
        let upper_c = (min_key as i32 / 12 + 1) * 12;
        let lower_c = (max_key as i32 / 12) * 12;
        let octaves = (lower_c - upper_c) as f64 / 12.0 + (1.0 - first.0) + last.1;
        let octave_width = if octaves > 0.0 { viewport.width / octaves } else { viewport.width };

        // Left edge of the octave that contains min_key
        let origin = viewport.left - first.0 * octave_width;
        let base_octave = (min_key / 12) as f64;

        let spans = (min_key..=max_key)
            .map(|key| {
                let (lo, hi) = OCTAVE_SPANS[(key % 12) as usize];
                let octave = (key / 12) as f64 - base_octave;
                KeySpan {
                    key,
                    left: origin + (octave + lo) * octave_width,
                    width: (hi - lo) * octave_width,
                }
            })
            .collect();

        Self { min_key, spans }
    }

    pub fn span(&self, key: u8) -> Option<&KeySpan> {
        key.checked_sub(self.min_key).and_then(|i| self.spans.get(i as usize))
    }

    pub fn spans(&self) -> &[KeySpan] {
        &self.spans
    }

    pub fn white_keys(&self) -> impl Iterator<Item = &KeySpan> + '_ {
        self.spans.iter().filter(|s| !s.is_black())
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &KeySpan> + '_ {
        self.spans.iter().filter(|s| s.is_black())
    }
}
