//! Renderers module for the piano-roll player
//!
//! Drawing is expressed against the [`Surface`] trait so the same renderer
//! drives a browser canvas or a recorded [`DisplayList`].

pub mod display_list;
pub mod keyboard;
pub mod piano_roll;
pub mod surface;

pub use display_list::{DisplayList, DrawCommand};
pub use keyboard::{is_black_key, KeySpan, KeyboardLayout};
pub use piano_roll::PianoRoll;
pub use surface::{Rect, Surface, TextAlign};
