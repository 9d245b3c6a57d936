//! MIDI parser
//!
//! Turns Standard MIDI File bytes into a [`Score`] in one non-resumable pass.
//! Either a complete score comes back or a [`ParseError`]; nothing partial is
//! ever handed to the transport.
//!
//! # Pipeline
//!
//! ```text
//! bytes → smf::read_header → smf::track_chunks → events::decode_track (per track)
//!       → events::merge_tracks → events::extract → Score::new
//! ```

pub mod events;
pub mod smf;

pub use smf::{SmfFormat, SmfHeader};

use crate::error::{ParseError, Result};
use crate::models::{Score, TempoMap, TimeSignatureMap};

/// Parse a complete Standard MIDI File.
pub fn parse_smf(bytes: &[u8]) -> Result<Score> {
    let header = smf::read_header(bytes)?;
    let chunks = smf::track_chunks(bytes, &header)?;
    if chunks.is_empty() {
        return Err(ParseError::NoTracks);
    }

    let tracks = chunks
        .iter()
        .enumerate()
        .map(|(i, body)| events::decode_track(i as u16, body))
        .collect::<Result<Vec<_>>>()?;

    let merged = events::merge_tracks(&tracks);
    let track_end_ticks: Vec<u64> = tracks.iter().map(|t| t.end_tick).collect();
    let extracted = events::extract(&merged, &track_end_ticks);

    let tpq = header.ticks_per_quarter;
    let score = Score::new(
        tpq,
        TempoMap::new(tpq, &extracted.tempos),
        TimeSignatureMap::new(&extracted.time_signatures),
        extracted.notes,
        tracks.len() as u16,
    );

    log::info!(
        "parsed SMF: format {:?}, {} tracks, {} tpq, {} notes, {} bars, {:.2}s",
        header.format,
        score.num_tracks(),
        tpq,
        score.notes().len(),
        score.num_bars(),
        score.duration()
    );

    Ok(score)
}
