//! The immutable Score
//!
//! A `Score` is built once by the parser and never mutated afterwards. The
//! transport replaces it wholesale on load; readers holding the previous
//! `Rc<Score>` keep a fully valid score until they let go of it.

use super::meter::TimeSignatureMap;
use super::note::{Note, NoteId, TimedNote};
use super::tempo::TempoMap;

#[derive(Debug, Clone)]
pub struct Score {
    pub(crate) ticks_per_quarter: u16,
    pub(crate) tempo_map: TempoMap,
    pub(crate) meter_map: TimeSignatureMap,
    /// Sorted by start time, then pitch; `notes[i].id == NoteId(i)`
    pub(crate) notes: Vec<TimedNote>,
    /// `num_bars + 1` tick boundaries (see [`TimeSignatureMap::bar_boundaries`])
    pub(crate) bar_ticks: Vec<u64>,
    /// Wall-clock time of each entry in `bar_ticks`
    pub(crate) bar_times: Vec<f64>,
    pub(crate) end_tick: u64,
    pub(crate) duration: f64,
    /// Longest single note, bounds the backwards search in window queries
    pub(crate) longest_note: f64,
    pub(crate) num_tracks: u16,
}

impl Score {
    /// Assemble a score and derive its caches.
    pub fn new(
        ticks_per_quarter: u16,
        tempo_map: TempoMap,
        meter_map: TimeSignatureMap,
        mut notes: Vec<Note>,
        num_tracks: u16,
    ) -> Self {
        let ticks_per_quarter = ticks_per_quarter.max(1);

        notes.sort_by(|a, b| {
            (a.start_tick, a.pitch, a.track, a.end_tick).cmp(&(b.start_tick, b.pitch, b.track, b.end_tick))
        });

        let mut score = Self {
            ticks_per_quarter,
            tempo_map,
            meter_map,
            notes: Vec::with_capacity(notes.len()),
            bar_ticks: Vec::new(),
            bar_times: Vec::new(),
            end_tick: notes.iter().map(|n| n.end_tick).max().unwrap_or(0),
            duration: 0.0,
            longest_note: 0.0,
            num_tracks,
        };

        // Start ticks are sorted and tick_to_seconds is monotonic, so start
        // times come out sorted too
        for (i, note) in notes.into_iter().enumerate() {
            let start = score.tick_to_seconds(note.start_tick);
            let end = score.tick_to_seconds(note.end_tick);
            score.longest_note = score.longest_note.max(end - start);
            score.duration = score.duration.max(end);
            score.notes.push(TimedNote { id: NoteId(i as u32), note, start, end });
        }

        score.bar_ticks = score.meter_map.bar_boundaries(ticks_per_quarter, score.end_tick);
        score.bar_times = score.bar_ticks.iter().map(|&t| score.tick_to_seconds(t)).collect();

        score
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    pub fn meter_map(&self) -> &TimeSignatureMap {
        &self.meter_map
    }

    pub fn notes(&self) -> &[TimedNote] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&TimedNote> {
        self.notes.get(id.index())
    }

    pub fn num_tracks(&self) -> u16 {
        self.num_tracks
    }

    /// Tick at which the last note ends
    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Seconds until the last note ends
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn bar_ticks(&self) -> &[u64] {
        &self.bar_ticks
    }

    pub fn bar_times(&self) -> &[f64] {
        &self.bar_times
    }

    /// Notes whose `[start, end)` overlaps `[from, to)`, in start order.
    ///
    /// Binary-searches the first candidate (no note can overlap `from` if it
    /// started more than `longest_note` earlier) and scans until start times
    /// pass `to`.
    pub fn notes_in_window(&self, from: f64, to: f64) -> impl Iterator<Item = &TimedNote> + '_ {
        let first = self.notes.partition_point(|n| n.start < from - self.longest_note);
        self.notes[first..]
            .iter()
            .take_while(move |n| n.start < to)
            .filter(move |n| n.overlaps(from, to))
    }

    /// Notes sounding at `time`, i.e. with `start <= time < end`.
    pub fn notes_at(&self, time: f64) -> impl Iterator<Item = &TimedNote> + '_ {
        let first = self.notes.partition_point(|n| n.start < time - self.longest_note);
        self.notes[first..]
            .iter()
            .take_while(move |n| n.start <= time)
            .filter(move |n| n.contains(time))
    }

    /// Notes starting in `[from, to)`.
    pub fn notes_starting_in(&self, from: f64, to: f64) -> &[TimedNote] {
        let first = self.notes.partition_point(|n| n.start < from);
        let last = self.notes.partition_point(|n| n.start < to);
        &self.notes[first..last.max(first)]
    }

    /// Notes starting in `[from, to]`.
    pub fn notes_starting_through(&self, from: f64, to: f64) -> &[TimedNote] {
        let first = self.notes.partition_point(|n| n.start < from);
        let last = self.notes.partition_point(|n| n.start <= to);
        &self.notes[first..last.max(first)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tempo::TempoChange;

    fn score_of(notes: Vec<Note>) -> Score {
        Score::new(
            480,
            TempoMap::new(480, &[TempoChange { tick: 0, micros_per_quarter: 500_000 }]),
            TimeSignatureMap::new(&[]),
            notes,
            1,
        )
    }

    #[test]
    fn test_notes_sorted_and_numbered() {
        let score = score_of(vec![
            Note::new(64, 90, 0, 0, 960, 1440),
            Note::new(60, 90, 0, 0, 0, 480),
            Note::new(62, 90, 0, 0, 480, 960),
        ]);
        let pitches: Vec<u8> = score.notes().iter().map(|n| n.note.pitch).collect();
        assert_eq!(pitches, vec![60, 62, 64]);
        for (i, n) in score.notes().iter().enumerate() {
            assert_eq!(n.id, NoteId(i as u32));
        }
        assert_eq!(score.notes()[1].start, 0.5);
        assert_eq!(score.duration(), 1.5);
    }

    #[test]
    fn test_window_query_finds_long_notes_started_earlier() {
        let score = score_of(vec![
            Note::new(48, 90, 0, 0, 0, 4800), // 5 seconds
            Note::new(60, 90, 0, 0, 480, 960),
            Note::new(62, 90, 0, 0, 2880, 3360),
        ]);
        let visible: Vec<u8> = score.notes_in_window(2.0, 3.0).map(|n| n.note.pitch).collect();
        assert_eq!(visible, vec![48]);

        let sounding: Vec<u8> = score.notes_at(3.0).map(|n| n.note.pitch).collect();
        assert_eq!(sounding, vec![48, 62]);
    }

    #[test]
    fn test_notes_starting_in_half_open() {
        let score = score_of(vec![
            Note::new(60, 90, 0, 0, 0, 480),
            Note::new(62, 90, 0, 0, 480, 960),
        ]);
        assert_eq!(score.notes_starting_in(0.0, 0.5).len(), 1);
        assert_eq!(score.notes_starting_in(0.5, 1.0).len(), 1);
        assert_eq!(score.notes_starting_in(1.0, 0.0).len(), 0);
        assert_eq!(score.notes_starting_through(0.0, 0.5).len(), 2);
    }
}
