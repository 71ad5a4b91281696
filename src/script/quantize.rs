// Onset delays → virtual time

use super::extract::Onset;

/// Pitch that maps to instrument pitch 0 before the configured shift
pub const PITCH_ORIGIN: i32 = 65;

/// Cutoff/compensation/multiplier model for compressing MIDI ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingModel {
    pub ignored_delta_cutoff: f64,
    pub wait_compensation: f64,
    pub wait_multiplier: f64,
}

impl TimingModel {
    /// Place a note `delay` ticks after the previous one on a track whose clock reads `clock`.
    ///
    /// Delays that are zero or below the cutoff leave the clock where it is,
    /// which is what stacks near-simultaneous notes onto one virtual time.
    pub fn quantize(&self, delay: u64, clock: f64) -> f64 {
        let delay = delay as f64;
        if delay >= self.ignored_delta_cutoff && delay > 0.0 {
            clock + (delay - self.wait_compensation).max(0.0) * self.wait_multiplier
        } else {
            clock
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedNote {
    pub virtual_time: f64,
    /// Already shifted: `raw - 65 + pitch_shift`
    pub pitch: i32,
    pub track: usize,
}

/// Convert one track's onsets into notes on its own virtual clock, starting at 0.
pub fn quantize_track(
    track: usize,
    onsets: &[Onset],
    model: &TimingModel,
    pitch_shift: i32,
) -> Vec<QuantizedNote> {
    let mut clock = 0.0;
    onsets
        .iter()
        .map(|onset| {
            clock = model.quantize(onset.delay, clock);
            QuantizedNote {
                virtual_time: clock,
                pitch: shift_pitch(onset.pitch, pitch_shift),
                track,
            }
        })
        .collect()
}

/// Map a MIDI pitch to the sequencer's pitch scale. No range check.
pub fn shift_pitch(raw: u8, pitch_shift: i32) -> i32 {
    raw as i32 - PITCH_ORIGIN + pitch_shift
}
