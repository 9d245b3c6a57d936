//! # Error Types
//!
//! Every failure in this crate is local and recoverable: a rejected load leaves
//! the previously loaded score active, and out-of-range transport inputs are
//! clamped rather than rejected.
//!
//! ## Usage
//! ```rust
//! use piano_roll_wasm::{parse_smf, ParseError};
//!
//! match parse_smf(b"RIFF not a midi file") {
//!     Ok(score) => println!("{} bars", score.num_bars()),
//!     Err(ParseError::BadHeader(reason)) => eprintln!("not a MIDI file: {}", reason),
//!     Err(e) => eprintln!("rejected: {}", e),
//! }
//! ```

use thiserror::Error;

/// Reasons a Standard MIDI File is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `MThd` chunk is missing, too short, or carries an invalid division.
    ///
    /// ```
    /// # use piano_roll_wasm::ParseError;
    /// let err = ParseError::BadHeader("expected MThd chunk".to_string());
    /// assert_eq!(err.to_string(), "bad header: expected MThd chunk");
    /// ```
    #[error("bad header: {0}")]
    BadHeader(String),

    /// The header is well formed but describes something this player cannot
    /// schedule (sequential format 2, SMPTE time-code division).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A chunk declares more bytes than the file holds, or its event stream
    /// ends in the middle of an event.
    #[error("truncated chunk: {0}")]
    TruncatedChunk(String),

    /// The header declares zero tracks or no `MTrk` chunk is present.
    #[error("file contains no tracks")]
    NoTracks,
}

/// What happened to a load once its bytes arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The new score replaced the current one.
    Committed,
    /// A newer load was issued while this one was in flight; its result was dropped.
    Superseded,
}

pub type Result<T> = std::result::Result<T, ParseError>;
