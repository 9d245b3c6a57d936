//! Display List for piano-roll rendering
//!
//! A [`Surface`] that records every draw call instead of rasterising it. Hosts
//! without a canvas can take the list as JSON and replay it; tests use it to
//! inspect what the renderer drew.

use super::surface::{Rect, Surface, TextAlign};
use serde::Serialize;
use std::convert::Infallible;

/// One recorded draw call
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    SetFillStyle { color: String },
    SetStrokeStyle { color: String },
    SetFont { font: String },
    FillRect { rect: Rect },
    StrokeLine { from: (f64, f64), to: (f64, f64) },
    FillRoundRect { rect: Rect, radius: f64 },
    FillText { text: String, x: f64, y: f64, align: TextAlign },
}

/// Top-level display list, in draw order
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Every rectangle filled while `color` was the fill style.
    pub fn filled_with(&self, color: &str) -> Vec<Rect> {
        let mut current: Option<&str> = None;
        let mut rects = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::SetFillStyle { color } => current = Some(color),
                DrawCommand::FillRect { rect } | DrawCommand::FillRoundRect { rect, .. }
                    if current == Some(color) =>
                {
                    rects.push(*rect)
                }
                _ => {}
            }
        }
        rects
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DisplayList {
    type Error = Infallible;

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::SetFillStyle { color: color.to_string() });
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::SetStrokeStyle { color: color.to_string() });
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::SetFont { font: font.to_string() });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect { rect });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.commands.push(DrawCommand::StrokeLine { from, to });
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f64) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::FillRoundRect { rect, radius });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, align: TextAlign) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::FillText { text: text.to_string(), x, y, align });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_with_tracks_current_style() {
        let mut list = DisplayList::new();
        list.set_fill_style("red");
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        list.set_fill_style("blue");
        list.fill_round_rect(Rect::new(1.0, 0.0, 1.0, 1.0), 2.0).unwrap();
        list.set_fill_style("red");
        list.fill_rect(Rect::new(2.0, 0.0, 1.0, 1.0));

        assert_eq!(list.filled_with("red").len(), 2);
        assert_eq!(list.filled_with("blue"), vec![Rect::new(1.0, 0.0, 1.0, 1.0)]);
    }

    #[test]
    fn test_serializes_with_op_tag() {
        let mut list = DisplayList::new();
        list.fill_text("1", 5.0, 6.0, TextAlign::Right).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(
            json,
            r#"{"commands":[{"op":"fillText","text":"1","x":5.0,"y":6.0,"align":"right"}]}"#
        );
    }
}
