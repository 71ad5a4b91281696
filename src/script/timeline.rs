// Cross-track merge of quantized notes into simultaneity groups

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::quantize::QuantizedNote;

/// Virtual time usable as an ordered map key.
///
/// Equality is exact on the f64 value (after optional rounding), with -0
/// folded into 0 so both land in the same group.
#[derive(Debug, Clone, Copy)]
pub struct TimeKey(f64);

impl TimeKey {
    pub fn new(virtual_time: f64, decimals: Option<u32>) -> Self {
        let value = match decimals {
            Some(d) => {
                let scale = 10f64.powi(d as i32);
                (virtual_time * scale).round() / scale
            }
            None => virtual_time,
        };
        // -0.0 == 0.0, so this also canonicalizes the sign
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Notes grouped by virtual time, ascending
#[derive(Debug, Default)]
pub struct Timeline {
    groups: BTreeMap<TimeKey, Vec<QuantizedNote>>,
    decimals: Option<u32>,
}

impl Timeline {
    pub fn new(decimals: Option<u32>) -> Self {
        Self {
            groups: BTreeMap::new(),
            decimals,
        }
    }

    /// Append a note to its group; within a group notes keep insertion order
    pub fn insert(&mut self, note: QuantizedNote) {
        let key = TimeKey::new(note.virtual_time, self.decimals);
        self.groups.entry(key).or_default().push(note);
    }

    /// Groups in ascending virtual time
    pub fn groups(&self) -> impl Iterator<Item = (f64, &[QuantizedNote])> {
        self.groups.iter().map(|(key, notes)| (key.value(), notes.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn note_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Merge per-track note lists, given in processing order, into one timeline.
pub fn merge<I>(per_track: I, decimals: Option<u32>) -> Timeline
where
    I: IntoIterator<Item = Vec<QuantizedNote>>,
{
    let mut timeline = Timeline::new(decimals);
    for notes in per_track {
        for note in notes {
            timeline.insert(note);
        }
    }
    timeline
}
