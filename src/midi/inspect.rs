// Per-track overview used to pick tracks for the instrument map

use super::{MidiFile, Track};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub index: usize,
    pub event_count: usize,
    /// Note-ons with a non-zero pitch byte
    pub note_on_count: usize,
    pub lowest_pitch: Option<u8>,
    pub highest_pitch: Option<u8>,
    pub total_ticks: u64,
}

impl TrackSummary {
    pub fn from_track(index: usize, track: &Track) -> Self {
        let pitches = || {
            track
                .events
                .iter()
                .filter_map(|e| e.note_on_pitch())
                .filter(|&p| p != 0)
        };

        Self {
            index,
            event_count: track.events.len(),
            note_on_count: pitches().count(),
            lowest_pitch: pitches().min(),
            highest_pitch: pitches().max(),
            total_ticks: track.events.iter().map(|e| e.delta_time as u64).sum(),
        }
    }
}

/// Summarize every track in file order
pub fn summarize_tracks(midi: &MidiFile) -> Vec<TrackSummary> {
    midi.tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackSummary::from_track(i, track))
        .collect()
}
