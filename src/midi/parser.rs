// MIDI file parser flattening midly events into raw (delta, type, data) records

use std::path::Path;

use super::{MidiError, Result};

/// Event type as the status nibble of a channel message, or the
/// system status byte for SysEx/meta events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    NoteOff,
    NoteOn,
    Aftertouch,
    Controller,
    ProgramChange,
    ChannelAftertouch,
    PitchBend,
    SysEx,
    Escape,
    Meta,
}

impl EventType {
    /// Numeric type code (`0x9` for note-on, `0xFF` for meta, ...)
    pub fn code(self) -> u8 {
        match self {
            EventType::NoteOff => 0x8,
            EventType::NoteOn => 0x9,
            EventType::Aftertouch => 0xA,
            EventType::Controller => 0xB,
            EventType::ProgramChange => 0xC,
            EventType::ChannelAftertouch => 0xD,
            EventType::PitchBend => 0xE,
            EventType::SysEx => 0xF0,
            EventType::Escape => 0xF7,
            EventType::Meta => 0xFF,
        }
    }
}

/// One track event with its delta time in ticks.
///
/// For channel messages `data` holds the message's data bytes in wire
/// order, so a note-on carries `[key, velocity]`. SysEx and escape events
/// carry their payload; meta events carry nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub delta_time: u32,
    pub kind: EventType,
    pub data: Vec<u8>,
}

impl RawEvent {
    /// Pitch byte of a note-on, or None for any other event
    pub fn note_on_pitch(&self) -> Option<u8> {
        match self.kind {
            EventType::NoteOn => self.data.first().copied(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub events: Vec<RawEvent>,
}

#[derive(Debug)]
pub struct MidiFile {
    /// None for SMPTE timecode files
    pub ticks_per_beat: Option<u16>,
    pub tracks: Vec<Track>,
}

/// Read and parse a MIDI file from disk.
pub fn read_midi_file(path: &Path) -> Result<MidiFile> {
    let data = std::fs::read(path).map_err(|source| MidiError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&data)
}

/// Parse raw SMF bytes into owned tracks of raw events.
pub fn parse(bytes: &[u8]) -> Result<MidiFile> {
    let smf = midly::Smf::parse(bytes)?;

    let ticks_per_beat = match smf.header.timing {
        midly::Timing::Metrical(tpb) => Some(tpb.as_int()),
        midly::Timing::Timecode(..) => None,
    };

    let tracks = smf
        .tracks
        .iter()
        .map(|track| Track {
            events: track.iter().map(flatten_event).collect(),
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Parsed MIDI file: {} tracks, {} events",
        tracks.len(),
        tracks.iter().map(|t| t.events.len()).sum::<usize>()
    );

    Ok(MidiFile { ticks_per_beat, tracks })
}

fn flatten_event(event: &midly::TrackEvent) -> RawEvent {
    let delta_time = event.delta.as_int();

    let (kind, data) = match event.kind {
        midly::TrackEventKind::Midi { message, .. } => match message {
            midly::MidiMessage::NoteOff { key, vel } => {
                (EventType::NoteOff, vec![key.as_int(), vel.as_int()])
            }
            midly::MidiMessage::NoteOn { key, vel } => {
                (EventType::NoteOn, vec![key.as_int(), vel.as_int()])
            }
            midly::MidiMessage::Aftertouch { key, vel } => {
                (EventType::Aftertouch, vec![key.as_int(), vel.as_int()])
            }
            midly::MidiMessage::Controller { controller, value } => {
                (EventType::Controller, vec![controller.as_int(), value.as_int()])
            }
            midly::MidiMessage::ProgramChange { program } => {
                (EventType::ProgramChange, vec![program.as_int()])
            }
            midly::MidiMessage::ChannelAftertouch { vel } => {
                (EventType::ChannelAftertouch, vec![vel.as_int()])
            }
            midly::MidiMessage::PitchBend { bend } => {
                let raw = bend.0.as_int();
                (EventType::PitchBend, vec![(raw & 0x7F) as u8, (raw >> 7) as u8])
            }
        },
        midly::TrackEventKind::SysEx(payload) => (EventType::SysEx, payload.to_vec()),
        midly::TrackEventKind::Escape(payload) => (EventType::Escape, payload.to_vec()),
        midly::TrackEventKind::Meta(_) => (EventType::Meta, Vec::new()),
    };

    RawEvent { delta_time, kind, data }
}
