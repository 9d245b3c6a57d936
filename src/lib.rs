//! Piano-Roll MIDI Player WASM Module
//!
//! Loads Standard MIDI Files, runs a bar-aware playback transport and draws a
//! falling-note piano roll. The core (`parse`, `models`, `transport`,
//! `renderers`, `player`) is plain Rust and runs natively; `api` and `audio`
//! bind it to the browser.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod player;
pub mod renderers;
pub mod transport;

// Re-export commonly used types
pub use config::{PlayerConfig, RenderConfig, SynthConfig};
pub use error::{LoadOutcome, ParseError};
pub use models::{Note, NoteId, Score, TimedNote};
pub use parse::parse_smf;
pub use player::Player;
pub use renderers::{DisplayList, DrawCommand, PianoRoll, Rect, Surface};
pub use transport::{LoopRegion, PlayState, TickStatus, Transport, TransportSnapshot, Trigger};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Piano-roll player WASM module initialized");
}
