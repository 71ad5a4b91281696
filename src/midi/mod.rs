// MIDI input: midly-backed parser and track inspection

pub mod inspect;
pub mod parser;

pub use inspect::*;
pub use parser::*;

use std::path::PathBuf;

/// Error type for reading and parsing MIDI files
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Failed to read MIDI file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed MIDI data: {0}")]
    Parse(#[from] midly::Error),
}

pub type Result<T> = std::result::Result<T, MidiError>;
