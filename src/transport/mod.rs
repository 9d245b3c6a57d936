//! Playback transport
//!
//! ## Sub-modules
//! - `engine` - the [`Transport`] state machine (clock, sounding set, loads)
//! - `state` - play state, loop region, tick status, snapshot types
//! - `trigger` - note-on/note-off intents handed to the synthesizer

mod engine;
mod state;
mod trigger;

pub use engine::Transport;
pub use state::{LoadTicket, LoopRegion, PlayState, TickStatus, TransportSnapshot};
pub use trigger::{velocity_gain, Trigger};
