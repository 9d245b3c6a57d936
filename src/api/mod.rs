//! Piano-roll player WASM API
//!
//! # Module Structure
//!
//! - `helpers`: serialization and error conversion at the JS boundary
//! - `canvas`: [`Surface`](crate::renderers::Surface) over `CanvasRenderingContext2d`
//! - `player`: the `MidiPlayer` class exported to JavaScript

pub mod canvas;
pub mod helpers;
pub mod player;

pub use canvas::CanvasSurface;
pub use player::MidiPlayer;
