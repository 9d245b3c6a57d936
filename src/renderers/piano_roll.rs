//! Falling-note piano roll
//!
//! Time runs vertically. The playhead sits at a fixed fraction `k` of the
//! viewport height from the bottom, so the visible window is
//! `[t - k * range, t + (1 - k) * range]`. Notes approach the playhead from
//! the top, and the keyboard occupies the strip below it.
//!
//! ## Draw order
//! 1. background
//! 2. octave guide lines
//! 3. loop shading
//! 4. bar lines and numbers, end-of-score marker
//! 5. notes (rounded, coloured by track)
//! 6. keyboard, sounding keys highlighted in their track colour

use super::keyboard::KeyboardLayout;
use super::surface::{Rect, Surface, TextAlign};
use crate::config::{defaults, RenderConfig};
use crate::models::Score;
use crate::transport::TransportSnapshot;

const BACKGROUND: &str = "#000000";
const OCTAVE_LINE: &str = "#404040";
const BAR_LINE: &str = "#808080";
const BAR_LABEL: &str = "#C0C0C0";
const END_LINE: &str = "#FFFFFF";
const LOOP_SHADE: &str = "rgba(255, 255, 255, 0.08)";
const WHITE_KEY: &str = "#FFFFFF";
const BLACK_KEY: &str = "#000000";
const KEY_BORDER: &str = "#808080";
const LABEL_FONT: &str = "16px sans-serif";

/// Black keys cover this share of the keyboard strip
const BLACK_KEY_DEPTH: f64 = 0.6;
const LABEL_INSET: f64 = 4.0;

pub struct PianoRoll {
    config: RenderConfig,
}

/// Per-frame geometry
struct Frame {
    viewport: Rect,
    keyboard: KeyboardLayout,
    current_time: f64,
    playhead_y: f64,
    px_per_sec: f64,
}

impl Frame {
    fn y_at(&self, time: f64) -> f64 {
        self.playhead_y - (time - self.current_time) * self.px_per_sec
    }

    /// Vertical band between two times, clipped to the roll area above the keyboard
    fn band(&self, left: f64, width: f64, from: f64, to: f64) -> Option<Rect> {
        let top = self.y_at(to);
        Rect::new(left, top, width, self.y_at(from) - top).clip_vertical(self.viewport.top, self.playhead_y)
    }
}

impl PianoRoll {
    pub fn new(config: RenderConfig) -> Self {
        Self { config: config.sanitized() }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Visible time window `(from, to)` for a snapshot.
    pub fn visible_window(&self, snapshot: &TransportSnapshot<'_>) -> (f64, f64) {
        let range = effective_range(snapshot.display_range);
        let k = self.config.playhead_fraction;
        (snapshot.current_time - k * range, snapshot.current_time + (1.0 - k) * range)
    }

    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        score: Option<&Score>,
        snapshot: &TransportSnapshot<'_>,
        viewport: Rect,
    ) -> Result<(), S::Error> {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Ok(());
        }

        let range = effective_range(snapshot.display_range);
        let frame = Frame {
            viewport,
            keyboard: KeyboardLayout::new(self.config.min_key, self.config.max_key, viewport),
            current_time: snapshot.current_time,
            playhead_y: viewport.bottom() - self.config.playhead_fraction * viewport.height,
            px_per_sec: viewport.height / range,
        };

        surface.set_fill_style(BACKGROUND);
        surface.fill_rect(viewport);

        self.draw_octave_lines(surface, &frame);

        if let Some(score) = score {
            let window = self.visible_window(snapshot);
            if let Some(region) = snapshot.loop_region {
                if let Some(shade) = frame.band(viewport.left, viewport.width, region.start_time, region.end_time) {
                    surface.set_fill_style(LOOP_SHADE);
                    surface.fill_rect(shade);
                }
            }
            self.draw_bar_lines(surface, &frame, score, window)?;
            self.draw_notes(surface, &frame, score, window)?;
        }

        self.draw_keyboard(surface, &frame, score, snapshot);
        Ok(())
    }

    fn draw_octave_lines<S: Surface>(&self, surface: &mut S, frame: &Frame) {
        surface.set_stroke_style(OCTAVE_LINE);
        for span in frame.keyboard.spans().iter().filter(|s| s.is_octave_start()) {
            surface.stroke_line((span.left, frame.viewport.top), (span.left, frame.playhead_y));
        }
    }

    fn draw_bar_lines<S: Surface>(
        &self,
        surface: &mut S,
        frame: &Frame,
        score: &Score,
        (from, to): (f64, f64),
    ) -> Result<(), S::Error> {
        let bar_times = score.bar_times();
        let Some((&end_time, starts)) = bar_times.split_last() else {
            return Ok(());
        };
        let (left, right) = (frame.viewport.left, frame.viewport.right());
        let label_x = right - LABEL_INSET;

        surface.set_font(LABEL_FONT);
        let first = starts.partition_point(|&t| t < from);
        for (bar, &time) in starts.iter().enumerate().skip(first) {
            if time > to {
                break;
            }
            let y = frame.y_at(time);
            if y > frame.playhead_y {
                continue;
            }
            surface.set_stroke_style(BAR_LINE);
            surface.stroke_line((left, y), (right, y));
            if self.config.show_bar_numbers {
                surface.set_fill_style(BAR_LABEL);
                surface.fill_text(&(bar + 1).to_string(), label_x, y - LABEL_INSET, TextAlign::Right)?;
            }
        }

        if (from..=to).contains(&end_time) {
            let y = frame.y_at(end_time);
            if y <= frame.playhead_y {
                surface.set_stroke_style(END_LINE);
                surface.stroke_line((left, y), (right, y));
                surface.set_fill_style(END_LINE);
                surface.fill_text("End", label_x, y - LABEL_INSET, TextAlign::Right)?;
            }
        }
        Ok(())
    }

    fn draw_notes<S: Surface>(
        &self,
        surface: &mut S,
        frame: &Frame,
        score: &Score,
        (from, to): (f64, f64),
    ) -> Result<(), S::Error> {
        let radius = self.config.note_corner_radius;
        let mut current_color: Option<&str> = None;
        for timed in score.notes_in_window(from, to) {
            let Some(span) = frame.keyboard.span(timed.note.pitch) else {
                continue;
            };
            let Some(rect) = frame.band(span.left, span.width, timed.start, timed.end) else {
                continue;
            };
            let color = self.config.track_color(timed.note.track);
            if current_color != Some(color) {
                surface.set_fill_style(color);
                current_color = Some(color);
            }
            surface.fill_round_rect(rect, radius.min(rect.width / 2.0).min(rect.height / 2.0))?;
        }
        Ok(())
    }

    fn draw_keyboard<S: Surface>(
        &self,
        surface: &mut S,
        frame: &Frame,
        score: Option<&Score>,
        snapshot: &TransportSnapshot<'_>,
    ) {
        let top = frame.playhead_y;
        let height = frame.viewport.bottom() - top;
        if height <= 0.0 {
            return;
        }

        // Track of the note sounding on each key, if any
        let mut lit: [Option<u16>; 128] = [None; 128];
        if let Some(score) = score {
            for timed in snapshot.sounding.iter().filter_map(|&id| score.note(id)) {
                lit[timed.note.pitch as usize & 0x7F] = Some(timed.note.track);
            }
        }
        let fill_for = |key: u8, base: &'static str| -> String {
            match lit[key as usize & 0x7F] {
                Some(track) => self.config.track_color(track).to_string(),
                None => base.to_string(),
            }
        };

        for span in frame.keyboard.white_keys() {
            surface.set_fill_style(&fill_for(span.key, WHITE_KEY));
            surface.fill_rect(Rect::new(span.left, top, span.width, height));
        }
        surface.set_stroke_style(KEY_BORDER);
        for span in frame.keyboard.white_keys() {
            surface.stroke_line((span.left, top), (span.left, top + height));
        }
        for span in frame.keyboard.black_keys() {
            surface.set_fill_style(&fill_for(span.key, BLACK_KEY));
            surface.fill_rect(Rect::new(span.left, top, span.width, height * BLACK_KEY_DEPTH));
        }
        surface.stroke_line((frame.viewport.left, top), (frame.viewport.right(), top));
    }
}

impl Default for PianoRoll {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

fn effective_range(range: f64) -> f64 {
    if range.is_finite() && range > 0.0 {
        range
    } else {
        defaults::DISPLAY_RANGE_SECS
    }
}
