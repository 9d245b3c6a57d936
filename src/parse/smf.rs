//! Standard MIDI File framing
//!
//! Validates the `MThd` header and splits the file into `MTrk` chunk bodies
//! before any event data is looked at. Event decoding happens in
//! [`super::events`].
//!
//! # Layout
//!
//! ```text
//! "MThd" len:u32  format:u16 ntrks:u16 division:u16 [extra header bytes]
//! "MTrk" len:u32  <len bytes of delta-time encoded events>
//! ...            (chunks with other tags are skipped)
//! ```

use crate::error::{ParseError, Result};

const HEADER_TAG: &[u8; 4] = b"MThd";
const TRACK_TAG: &[u8; 4] = b"MTrk";
const CHUNK_PREAMBLE: usize = 8;
const MIN_HEADER_LEN: usize = 6;

/// `format` field of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmfFormat {
    /// Format 0: one multi-channel track
    SingleTrack,
    /// Format 1: simultaneous tracks sharing one timeline
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmfHeader {
    pub format: SmfFormat,
    pub declared_tracks: u16,
    pub ticks_per_quarter: u16,
    /// Offset of the first chunk after the header
    pub(crate) body_offset: usize,
}

/// Validate the header chunk.
pub fn read_header(bytes: &[u8]) -> Result<SmfHeader> {
    if bytes.len() < CHUNK_PREAMBLE + MIN_HEADER_LEN {
        return Err(ParseError::BadHeader(format!("file is only {} bytes", bytes.len())));
    }
    if &bytes[0..4] != HEADER_TAG {
        return Err(ParseError::BadHeader("expected MThd chunk".to_string()));
    }

    let header_len = read_u32(bytes, 4) as usize;
    if header_len < MIN_HEADER_LEN {
        return Err(ParseError::BadHeader(format!("header length {} is below 6", header_len)));
    }
    let body_offset = CHUNK_PREAMBLE
        .checked_add(header_len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| ParseError::TruncatedChunk(format!("MThd declares {} bytes", header_len)))?;

    let format = match read_u16(bytes, 8) {
        0 => SmfFormat::SingleTrack,
        1 => SmfFormat::Parallel,
        2 => return Err(ParseError::UnsupportedFormat("sequential (format 2) files".to_string())),
        other => return Err(ParseError::UnsupportedFormat(format!("format {}", other))),
    };

    let declared_tracks = read_u16(bytes, 10);
    if declared_tracks == 0 {
        return Err(ParseError::NoTracks);
    }

    let division = read_u16(bytes, 12);
    if division & 0x8000 != 0 {
        return Err(ParseError::UnsupportedFormat("SMPTE time-code division".to_string()));
    }
    if division == 0 {
        return Err(ParseError::BadHeader("ticks per quarter note is zero".to_string()));
    }

    Ok(SmfHeader {
        format,
        declared_tracks,
        ticks_per_quarter: division,
        body_offset,
    })
}

/// Bodies of the first `declared_tracks` `MTrk` chunks.
///
/// Chunks with unknown tags are skipped. Anything after the last declared
/// track is ignored.
pub fn track_chunks<'a>(bytes: &'a [u8], header: &SmfHeader) -> Result<Vec<&'a [u8]>> {
    let wanted = header.declared_tracks as usize;
    let mut tracks = Vec::with_capacity(wanted);
    let mut offset = header.body_offset;

    while tracks.len() < wanted {
        if offset == bytes.len() {
            if tracks.is_empty() {
                return Err(ParseError::NoTracks);
            }
            return Err(ParseError::TruncatedChunk(format!(
                "header declares {} tracks, file holds {}",
                wanted,
                tracks.len()
            )));
        }
        if bytes.len() - offset < CHUNK_PREAMBLE {
            return Err(ParseError::TruncatedChunk(format!("chunk header cut off at byte {}", offset)));
        }

        let tag = &bytes[offset..offset + 4];
        let len = read_u32(bytes, offset + 4) as usize;
        let start = offset + CHUNK_PREAMBLE;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                ParseError::TruncatedChunk(format!(
                    "{} chunk at byte {} declares {} bytes, {} remain",
                    String::from_utf8_lossy(tag),
                    offset,
                    len,
                    bytes.len() - start
                ))
            })?;

        if tag == TRACK_TAG {
            tracks.push(&bytes[start..end]);
        } else {
            log::debug!("skipping unknown {:?} chunk ({} bytes)", String::from_utf8_lossy(tag), len);
        }
        offset = end;
    }

    Ok(tracks)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(format: u16, tracks: u16, division: u16) -> Vec<u8> {
        let mut bytes = b"MThd".to_vec();
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&format.to_be_bytes());
        bytes.extend_from_slice(&tracks.to_be_bytes());
        bytes.extend_from_slice(&division.to_be_bytes());
        bytes
    }

    fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut bytes = tag.to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_valid_header() {
        let parsed = read_header(&header(1, 2, 480)).unwrap();
        assert_eq!(parsed.format, SmfFormat::Parallel);
        assert_eq!(parsed.declared_tracks, 2);
        assert_eq!(parsed.ticks_per_quarter, 480);
        assert_eq!(parsed.body_offset, 14);
    }

    #[test]
    fn test_header_errors() {
        let mut wrong_tag = header(1, 1, 480);
        wrong_tag[0..4].copy_from_slice(b"RIFF");
        assert!(matches!(read_header(&wrong_tag), Err(ParseError::BadHeader(_))));
        assert!(matches!(read_header(b"MThd"), Err(ParseError::BadHeader(_))));
        assert!(matches!(read_header(&header(2, 1, 480)), Err(ParseError::UnsupportedFormat(_))));
        assert!(matches!(read_header(&header(1, 1, 0xE728)), Err(ParseError::UnsupportedFormat(_))));
        assert!(matches!(read_header(&header(1, 1, 0)), Err(ParseError::BadHeader(_))));
        assert_eq!(read_header(&header(1, 0, 480)), Err(ParseError::NoTracks));
    }

    #[test]
    fn test_oversized_header_length_is_truncation() {
        let mut bytes = header(0, 1, 96);
        bytes[4..8].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(read_header(&bytes), Err(ParseError::TruncatedChunk(_))));
    }

    #[test]
    fn test_track_chunks_skip_unknown() {
        let mut bytes = header(1, 2, 480);
        bytes.extend(chunk(b"MTrk", &[0x00, 0xFF, 0x2F, 0x00]));
        bytes.extend(chunk(b"XFIH", &[1, 2, 3]));
        bytes.extend(chunk(b"MTrk", &[0x00, 0xFF, 0x2F, 0x00]));
        let parsed = read_header(&bytes).unwrap();
        let tracks = track_chunks(&bytes, &parsed).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1], &[0x00u8, 0xFF, 0x2F, 0x00][..]);
    }

    #[test]
    fn test_track_chunk_truncated() {
        let mut bytes = header(1, 1, 480);
        bytes.extend(chunk(b"MTrk", &[0x00, 0xFF, 0x2F, 0x00]));
        bytes.truncate(bytes.len() - 2);
        let parsed = read_header(&bytes).unwrap();
        assert!(matches!(track_chunks(&bytes, &parsed), Err(ParseError::TruncatedChunk(_))));
    }

    #[test]
    fn test_missing_tracks() {
        let bytes = header(1, 1, 480);
        let parsed = read_header(&bytes).unwrap();
        assert_eq!(track_chunks(&bytes, &parsed), Err(ParseError::NoTracks));

        let mut bytes = header(1, 2, 480);
        bytes.extend(chunk(b"MTrk", &[0x00, 0xFF, 0x2F, 0x00]));
        let parsed = read_header(&bytes).unwrap();
        assert!(matches!(track_chunks(&bytes, &parsed), Err(ParseError::TruncatedChunk(_))));
    }
}
