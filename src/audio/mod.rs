//! Audio output for the browser host

pub mod synth;

pub use synth::WebSynth;
