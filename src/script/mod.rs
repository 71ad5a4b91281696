// MIDI → note script conversion pipeline
//
// extract (per track) → quantize (per track) → merge → emit → truncate

pub mod extract;
pub mod quantize;
pub mod timeline;
pub mod tokens;

use crate::config::Config;
use crate::midi::MidiFile;

use extract::extract_onsets;
use quantize::quantize_track;
use timeline::merge;
use tokens::{emit, TokenStream};

/// Error type for the conversion stages
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Track {index} does not exist (file has {available} tracks)")]
    TrackOutOfRange { index: usize, available: usize },

    #[error("No instrument mapped for track {0}")]
    UnmappedTrack(usize),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Result of one conversion run
#[derive(Debug, Clone)]
pub struct Conversion {
    pub stream: TokenStream,
    /// Tokens cut by the budget
    pub dropped: usize,
}

impl Conversion {
    /// Number of tokens in the final script
    pub fn parts(&self) -> usize {
        self.stream.len()
    }

    /// The `|`-joined artifact text
    pub fn script(&self) -> String {
        self.stream.to_string()
    }
}

/// Convert the configured tracks of a parsed MIDI file into a truncated token stream.
pub fn convert(midi: &MidiFile, config: &Config) -> Result<Conversion> {
    let model = config.timing_model();

    let per_track = config
        .tracks
        .iter()
        .map(|mapping| {
            let track = midi.tracks.get(mapping.index).ok_or(ConvertError::TrackOutOfRange {
                index: mapping.index,
                available: midi.tracks.len(),
            })?;

            let onsets = extract_onsets(&track.events);
            let notes = quantize_track(mapping.index, &onsets, &model, config.pitch_shift);
            log::debug!(
                "Track {} ({}): {} notes from {} events",
                mapping.index,
                mapping.instrument,
                notes.len(),
                track.events.len()
            );
            Ok(notes)
        })
        .collect::<Result<Vec<_>>>()?;

    let timeline = merge(per_track, config.time_key_decimals);
    log::debug!(
        "Timeline: {} notes in {} groups",
        timeline.note_count(),
        timeline.group_count()
    );

    let mut stream = emit(config, &timeline)?;
    let dropped = stream.truncate(config.max_tokens);

    Ok(Conversion { stream, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackMapping;
    use crate::midi::{EventType, RawEvent, Track};
    use std::path::PathBuf;

    fn note_on(delta_time: u32, pitch: u8) -> RawEvent {
        RawEvent {
            delta_time,
            kind: EventType::NoteOn,
            data: vec![pitch, 100],
        }
    }

    fn note_off(delta_time: u32, pitch: u8) -> RawEvent {
        RawEvent {
            delta_time,
            kind: EventType::NoteOff,
            data: vec![pitch, 0],
        }
    }

    fn midi(tracks: Vec<Vec<RawEvent>>) -> MidiFile {
        MidiFile {
            ticks_per_beat: Some(480),
            tracks: tracks.into_iter().map(|events| Track { events }).collect(),
        }
    }

    fn config(tracks: &[(usize, &str)]) -> Config {
        Config {
            midi_file: PathBuf::from("test.mid"),
            output_file: PathBuf::from("out.txt"),
            max_tokens: 100,
            bpm: 100.0,
            ignored_delta_cutoff: 2.0,
            pitch_shift: 0,
            wait_compensation: 0.0,
            wait_multiplier: 1.0,
            time_key_decimals: None,
            tracks: tracks
                .iter()
                .map(|&(index, instrument)| TrackMapping {
                    index,
                    instrument: instrument.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_reference_example() {
        let file = midi(vec![vec![note_on(0, 60), note_on(5, 64), note_on(0, 67)]]);
        let conversion = convert(&file, &config(&[(0, "X")])).unwrap();
        assert_eq!(
            conversion.script(),
            "!speed@100|!stop@0|X@-5|!stop@5|X@-1|!combine|X@2"
        );
        assert_eq!(conversion.parts(), 7);
        assert_eq!(conversion.dropped, 0);
    }

    #[test]
    fn test_reference_example_truncated() {
        let file = midi(vec![vec![note_on(0, 60), note_on(5, 64), note_on(0, 67)]]);
        let mut cfg = config(&[(0, "X")]);
        cfg.max_tokens = 3;

        let conversion = convert(&file, &cfg).unwrap();
        assert_eq!(conversion.script(), "!speed@100|!stop@0|X@-5");
        assert_eq!(conversion.dropped, 4);
    }

    #[test]
    fn test_tracks_meeting_at_same_time_combine() {
        let file = midi(vec![
            vec![note_on(10, 70)],
            vec![note_off(4, 50), note_on(6, 50)],
        ]);
        let conversion = convert(&file, &config(&[(0, "harp"), (1, "bass")])).unwrap();
        assert_eq!(
            conversion.script(),
            "!speed@100|!stop@10|harp@5|!combine|bass@-15"
        );
    }

    #[test]
    fn test_declared_track_order_drives_group_order() {
        let file = midi(vec![vec![note_on(0, 65)], vec![note_on(0, 66)]]);
        let conversion = convert(&file, &config(&[(1, "b"), (0, "a")])).unwrap();
        assert_eq!(conversion.script(), "!speed@100|!stop@0|b@1|!combine|a@0");
    }

    #[test]
    fn test_unlisted_tracks_ignored() {
        let file = midi(vec![vec![note_on(0, 65)], vec![note_on(3, 66)]]);
        let conversion = convert(&file, &config(&[(1, "b")])).unwrap();
        assert_eq!(conversion.script(), "!speed@100|!stop@3|b@1");
    }

    #[test]
    fn test_cutoff_suppresses_stop() {
        let file = midi(vec![vec![note_on(10, 60), note_on(1, 62)]]);
        let conversion = convert(&file, &config(&[(0, "X")])).unwrap();
        assert_eq!(conversion.script(), "!speed@100|!stop@10|X@-5|!combine|X@-3");
    }

    #[test]
    fn test_zero_pitch_delta_flows_into_next_gap() {
        let file = midi(vec![vec![note_on(2, 60), note_on(3, 0), note_on(4, 61)]]);
        let conversion = convert(&file, &config(&[(0, "X")])).unwrap();
        assert_eq!(conversion.script(), "!speed@100|!stop@2|X@-5|!stop@7|X@-4");
    }

    #[test]
    fn test_missing_track_is_an_error() {
        let file = midi(vec![vec![note_on(0, 60)]]);
        let err = convert(&file, &config(&[(0, "X"), (4, "Y")])).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::TrackOutOfRange { index: 4, available: 1 }
        ));
    }

    #[test]
    fn test_output_is_deterministic() {
        let file = midi(vec![
            vec![note_on(0, 60), note_on(7, 62), note_on(1, 64)],
            vec![note_on(3, 48), note_on(3, 50)],
        ]);
        let mut cfg = config(&[(0, "harp"), (1, "bass")]);
        cfg.wait_multiplier = 1.0 / 3.0;

        let first = convert(&file, &cfg).unwrap().script();
        let second = convert(&file, &cfg).unwrap().script();
        assert_eq!(first, second);
    }

    #[test]
    fn test_budget_bound_holds() {
        let events: Vec<RawEvent> = (0..50).map(|i| note_on(3, 40 + i as u8)).collect();
        let file = midi(vec![events]);
        let mut cfg = config(&[(0, "X")]);
        cfg.max_tokens = 17;

        let script = convert(&file, &cfg).unwrap().script();
        assert!(script.starts_with("!speed@100"));
        assert_eq!(script.split('|').count(), 17);
    }
}
