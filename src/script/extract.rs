// Note-on onset extraction

use crate::midi::RawEvent;

/// An accepted note-on and the ticks accumulated since the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Onset {
    pub delay: u64,
    pub pitch: u8,
}

/// Walk a track's events and yield one onset per note-on with a non-zero pitch.
///
/// Every event's delta time feeds the accumulator, including skipped
/// pitch-0 note-ons, so silent markers never split a gap in two.
pub fn extract_onsets(events: &[RawEvent]) -> Vec<Onset> {
    let (_, onsets) = events.iter().fold(
        (0u64, Vec::new()),
        |(since_last, mut onsets), event| {
            let since_last = since_last + event.delta_time as u64;
            match event.note_on_pitch() {
                Some(pitch) if pitch != 0 => {
                    onsets.push(Onset { delay: since_last, pitch });
                    (0, onsets)
                }
                _ => (since_last, onsets),
            }
        },
    );
    onsets
}
