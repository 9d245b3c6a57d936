//! 2D drawing surface abstraction
//!
//! The renderer issues draw calls against a [`Surface`]; rasterisation is the
//! host's job. A canvas implementation lives in `api::canvas`, and
//! [`DisplayList`](super::DisplayList) records the calls as data.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Same horizontal extent, vertical extent clipped to `[top, bottom]`.
    pub fn clip_vertical(&self, top: f64, bottom: f64) -> Option<Rect> {
        let clipped_top = self.top.max(top);
        let clipped_bottom = self.bottom().min(bottom);
        (clipped_bottom > clipped_top).then(|| Rect::new(self.left, clipped_top, self.width, clipped_bottom - clipped_top))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
        }
    }
}

/// Draw calls used by the piano roll. Text is drawn bottom-aligned.
pub trait Surface {
    type Error;

    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_font(&mut self, font: &str);
    fn fill_rect(&mut self, rect: Rect);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64));
    fn fill_round_rect(&mut self, rect: Rect, radius: f64) -> Result<(), Self::Error>;
    fn fill_text(&mut self, text: &str, x: f64, y: f64, align: TextAlign) -> Result<(), Self::Error>;
}
