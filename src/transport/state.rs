//! Transport state types

use crate::models::NoteId;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// Active loop: bars `[start_bar, end_bar)` and their cached start times.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoopRegion {
    pub start_bar: usize,
    pub end_bar: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl LoopRegion {
    pub fn len(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// What one `tick` call did.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// Stopped or nothing loaded; time did not move
    Idle,
    /// A load is in flight; the frame was skipped
    Deferred,
    Advanced,
    /// Time crossed the loop end and wrapped to the loop start
    Looped,
    /// Time reached the end of the score; the transport stopped
    Finished,
}

/// Handle for one in-flight load. Only the most recently issued ticket can commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
}

/// Read-only view of the transport handed to the renderer for one frame.
#[derive(Clone, Debug)]
pub struct TransportSnapshot<'a> {
    pub current_time: f64,
    pub display_range: f64,
    pub playing: bool,
    pub loop_region: Option<LoopRegion>,
    pub sounding: &'a BTreeSet<NoteId>,
}
