//! `Surface` over a browser 2D canvas context

use crate::renderers::{Rect, Surface, TextAlign};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        ctx.set_text_baseline("bottom");
        Self { ctx }
    }
}

impl Surface for CanvasSurface<'_> {
    type Error = JsValue;

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(rect.left, rect.top, rect.width, rect.height);
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f64) -> Result<(), JsValue> {
        let (left, top, right, bottom) = (rect.left, rect.top, rect.right(), rect.bottom());
        let ctx = self.ctx;
        ctx.begin_path();
        ctx.move_to(left + radius, top);
        ctx.arc_to(right, top, right, bottom, radius)?;
        ctx.arc_to(right, bottom, left, bottom, radius)?;
        ctx.arc_to(left, bottom, left, top, radius)?;
        ctx.arc_to(left, top, right, top, radius)?;
        ctx.close_path();
        ctx.fill();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, align: TextAlign) -> Result<(), JsValue> {
        self.ctx.set_text_align(align.as_str());
        self.ctx.fill_text(text, x, y)
    }
}
