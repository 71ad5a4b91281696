//! MIDI Track Inspector
//!
//! Lists every track in a MIDI file with its note-on count and pitch range,
//! to help choose the `[[track]]` entries of a notescript config.
//!
//! Usage:
//!   cargo run --bin midi_tracks -- <file.mid> [--verbose]

use std::path::PathBuf;

use notescript_lib::midi::{read_midi_file, summarize_tracks};
use notescript_lib::script::quantize::shift_pitch;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "--verbose");
    let path = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from);

    let Some(path) = path else {
        eprintln!("Usage: midi_tracks <file.mid> [--verbose]");
        std::process::exit(2);
    };

    // Init logging
    notescript_lib::init_logging(verbose);

    let midi = match read_midi_file(&path) {
        Ok(midi) => midi,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== {} ===\n", path.display());
    match midi.ticks_per_beat {
        Some(tpb) => println!("  Ticks per beat: {}", tpb),
        None => println!("  Timing: SMPTE timecode"),
    }
    println!("  Tracks: {}\n", midi.tracks.len());

    for summary in summarize_tracks(&midi) {
        let range = match (summary.lowest_pitch, summary.highest_pitch) {
            (Some(lo), Some(hi)) => format!(
                "pitch {}..={} (unshifted script pitch {}..={})",
                lo,
                hi,
                shift_pitch(lo, 0),
                shift_pitch(hi, 0)
            ),
            _ => "no notes".to_string(),
        };
        println!(
            "  [{}] {} events, {} note-ons, {} ticks, {}",
            summary.index, summary.event_count, summary.note_on_count, summary.total_ticks, range
        );
    }

    println!();
}
