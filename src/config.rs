//! Player configuration
//!
//! All settings are optional when supplied from JavaScript; missing fields fall
//! back to the constants in [`defaults`].

use serde::{Deserialize, Serialize};

pub mod defaults {
    //! Default values for playback, rendering and synthesis.

    /// Seconds of timeline visible in one frame
    pub const DISPLAY_RANGE_SECS: f64 = 3.0;

    /// Master gain, 0.0 - 1.0
    pub const VOLUME: f32 = 1.0;

    /// Lowest key drawn (A0)
    pub const MIN_KEY: u8 = 21;

    /// Highest key drawn (C8)
    pub const MAX_KEY: u8 = 108;

    /// Share of the viewport below the playhead (also the keyboard height)
    pub const PLAYHEAD_FRACTION: f64 = 0.1;

    /// Corner radius of note rectangles in pixels
    pub const NOTE_CORNER_RADIUS: f64 = 4.0;

    /// Per-track note colours, cycled by track index
    pub const TRACK_COLORS: [&str; 4] = ["#4682B4", "#E66101", "#009E73", "#7B4173"];

    /// Tempo assumed until the first tempo event (120 BPM)
    pub const MICROS_PER_QUARTER: u32 = 500_000;

    /// Meter assumed until the first time signature event
    pub const TIME_SIGNATURE: (u8, u8) = (4, 4);

    pub const ATTACK_SECS: f64 = 0.1;
    pub const DECAY_SECS: f64 = 0.2;
    pub const SUSTAIN_LEVEL: f32 = 0.5;
    pub const RELEASE_SECS: f64 = 1.2;

    pub const COMPRESSOR_THRESHOLD_DB: f32 = -20.0;
    pub const COMPRESSOR_KNEE_DB: f32 = 15.0;
    pub const COMPRESSOR_RATIO: f32 = 20.0;
}

/// Everything the host can tune about a player.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    pub display_range_secs: f64,
    pub volume: f32,
    pub render: RenderConfig,
    pub synth: SynthConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            display_range_secs: defaults::DISPLAY_RANGE_SECS,
            volume: defaults::VOLUME,
            render: RenderConfig::default(),
            synth: SynthConfig::default(),
        }
    }
}

/// Piano-roll appearance
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub min_key: u8,
    pub max_key: u8,
    /// Fixed playhead split `k`: the window shows `k * range` of the past
    pub playhead_fraction: f64,
    pub note_corner_radius: f64,
    pub track_colors: Vec<String>,
    pub show_bar_numbers: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_key: defaults::MIN_KEY,
            max_key: defaults::MAX_KEY,
            playhead_fraction: defaults::PLAYHEAD_FRACTION,
            note_corner_radius: defaults::NOTE_CORNER_RADIUS,
            track_colors: defaults::TRACK_COLORS.iter().map(|c| c.to_string()).collect(),
            show_bar_numbers: true,
        }
    }
}

impl RenderConfig {
    /// Repair values a host could plausibly get wrong.
    pub fn sanitized(mut self) -> Self {
        self.min_key = self.min_key.min(127);
        self.max_key = self.max_key.min(127);
        if self.min_key > self.max_key {
            std::mem::swap(&mut self.min_key, &mut self.max_key);
        }
        if !self.playhead_fraction.is_finite() {
            self.playhead_fraction = defaults::PLAYHEAD_FRACTION;
        }
        self.playhead_fraction = self.playhead_fraction.clamp(0.0, 0.9);
        if self.track_colors.is_empty() {
            self.track_colors = RenderConfig::default().track_colors;
        }
        self
    }

    pub fn track_color(&self, track: u16) -> &str {
        &self.track_colors[track as usize % self.track_colors.len()]
    }
}

/// Voice envelope and bus compressor settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    pub attack_secs: f64,
    pub decay_secs: f64,
    /// Sustain as a fraction of the velocity gain
    pub sustain_level: f32,
    pub release_secs: f64,
    pub compressor_threshold_db: f32,
    pub compressor_knee_db: f32,
    pub compressor_ratio: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            attack_secs: defaults::ATTACK_SECS,
            decay_secs: defaults::DECAY_SECS,
            sustain_level: defaults::SUSTAIN_LEVEL,
            release_secs: defaults::RELEASE_SECS,
            compressor_threshold_db: defaults::COMPRESSOR_THRESHOLD_DB,
            compressor_knee_db: defaults::COMPRESSOR_KNEE_DB,
            compressor_ratio: defaults::COMPRESSOR_RATIO,
        }
    }
}
