// Configuration management for notescript

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::script::quantize::TimingModel;
use crate::script::tokens::DELIMITER;

/// Config file looked up in the working directory when none is given
pub const LOCAL_CONFIG_FILE: &str = "notescript.toml";

/// Error type for loading and validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No config file found (looked for {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Conversion configuration, read once per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source MIDI file. Relative paths resolve against the config file's directory.
    #[serde(alias = "midiFile")]
    pub midi_file: PathBuf,

    /// Where the note script is written
    #[serde(default = "default_output_file", alias = "outputFile")]
    pub output_file: PathBuf,

    /// Hard cap on the number of emitted tokens
    #[serde(alias = "maxTokens", alias = "max_parts", alias = "maxParts")]
    pub max_tokens: usize,

    /// Written verbatim into the leading `!speed@` token
    pub bpm: f64,

    /// Minimum accumulated delay (ticks) that counts as a real gap
    #[serde(alias = "ignoredDeltaCutoff")]
    pub ignored_delta_cutoff: f64,

    /// Added to `pitch - 65` for every emitted note
    #[serde(alias = "pitchShift")]
    pub pitch_shift: i32,

    /// Subtracted from each gap before scaling (floored at 0)
    #[serde(alias = "waitCompensation")]
    pub wait_compensation: f64,

    /// Scales compensated gaps into virtual time
    #[serde(alias = "waitMultiplier")]
    pub wait_multiplier: f64,

    /// Round timeline keys to this many decimals before grouping.
    /// Unset means notes group only on exactly equal virtual times.
    #[serde(default, alias = "timeKeyDecimals")]
    pub time_key_decimals: Option<u32>,

    /// Tracks to convert, processed in the order listed
    #[serde(rename = "track", alias = "tracks")]
    pub tracks: Vec<TrackMapping>,
}

/// One entry of the track → instrument map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMapping {
    /// Zero-based track index in the MIDI file
    pub index: usize,
    /// Instrument token name, e.g. `noteblock_harp`
    pub instrument: String,
}

impl Config {
    /// Load, resolve and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text without touching the filesystem
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Make a relative `midi_file` relative to `base` instead of the working directory
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.midi_file.is_relative() {
            self.midi_file = base.join(&self.midi_file);
        }
    }

    /// Check every invariant the conversion relies on
    pub fn validate(&self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(invalid("at least one [[track]] entry is required"));
        }

        let mut seen = HashSet::new();
        for mapping in &self.tracks {
            if !seen.insert(mapping.index) {
                return Err(invalid(format!("track {} is mapped more than once", mapping.index)));
            }
            if mapping.instrument.is_empty() {
                return Err(invalid(format!("track {} has an empty instrument name", mapping.index)));
            }
            if mapping.instrument.contains(DELIMITER) {
                return Err(invalid(format!(
                    "instrument name '{}' contains the token delimiter '{}'",
                    mapping.instrument, DELIMITER
                )));
            }
        }

        if self.max_tokens == 0 {
            return Err(invalid("max_tokens must be at least 1"));
        }

        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(invalid(format!("bpm must be a positive number, got {}", self.bpm)));
        }
        if self.bpm > MAX_BPM {
            log::warn!("bpm {} is above {}; the sequencer may clamp it", self.bpm, MAX_BPM);
        }

        for (name, value) in [
            ("ignored_delta_cutoff", self.ignored_delta_cutoff),
            ("wait_compensation", self.wait_compensation),
            ("wait_multiplier", self.wait_multiplier),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be a finite number", name)));
            }
        }

        if self.wait_multiplier < 0.0 {
            return Err(invalid("wait_multiplier must not be negative"));
        }

        if let Some(decimals) = self.time_key_decimals {
            if decimals > MAX_TIME_KEY_DECIMALS {
                return Err(invalid(format!(
                    "time_key_decimals must be at most {}",
                    MAX_TIME_KEY_DECIMALS
                )));
            }
        }

        Ok(())
    }

    /// Timing parameters for the quantizer
    pub fn timing_model(&self) -> TimingModel {
        TimingModel {
            ignored_delta_cutoff: self.ignored_delta_cutoff,
            wait_compensation: self.wait_compensation,
            wait_multiplier: self.wait_multiplier,
        }
    }

    /// Instrument name mapped to a MIDI track index
    pub fn instrument_for(&self, track_index: usize) -> Option<&str> {
        self.tracks
            .iter()
            .find(|m| m.index == track_index)
            .map(|m| m.instrument.as_str())
    }
}

/// Find the config file: the explicit path if given, otherwise the first
/// existing of `./notescript.toml` and `<config dir>/notescript/config.toml`.
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = default_config_candidates();
    match candidates.iter().find(|p| p.exists()) {
        Some(found) => Ok(found.clone()),
        None => Err(ConfigError::NotFound(candidates)),
    }
}

fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("notescript").join("config.toml"));
    }
    candidates
}

/// bpm values the sequencer accepts without clamping
const MAX_BPM: f64 = 10_000.0;

/// f64 carries ~15-17 significant digits; rounding finer is meaningless
const MAX_TIME_KEY_DECIMALS: u32 = 15;

/// Default artifact path (for serde)
fn default_output_file() -> PathBuf {
    PathBuf::from("out.🗿")
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
        midi_file = "song.mid"
        max_tokens = 500
        bpm = 10000
        ignored_delta_cutoff = 0
        pitch_shift = 5
        wait_compensation = 0
        wait_multiplier = 0.1

        [[track]]
        index = 1
        instrument = "noteblock_bass"

        [[track]]
        index = 0
        instrument = "noteblock_harp"
    "#;

    #[test]
    fn test_parse_basic_config() {
        let config = Config::from_toml_str(BASIC).unwrap();
        assert_eq!(config.midi_file, PathBuf::from("song.mid"));
        assert_eq!(config.output_file, PathBuf::from("out.🗿"));
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.bpm, 10000.0);
        assert_eq!(config.pitch_shift, 5);
        assert_eq!(config.wait_multiplier, 0.1);
        assert_eq!(config.time_key_decimals, None);
        // Declared order is kept, not sorted by index
        assert_eq!(config.tracks[0].index, 1);
        assert_eq!(config.tracks[1].index, 0);
        assert_eq!(config.instrument_for(0), Some("noteblock_harp"));
        assert_eq!(config.instrument_for(7), None);
    }

    #[test]
    fn test_camel_case_aliases() {
        let config = Config::from_toml_str(
            r#"
            midiFile = "a.mid"
            outputFile = "a.txt"
            maxParts = 10
            bpm = 120.5
            ignoredDeltaCutoff = 2
            pitchShift = -3
            waitCompensation = 1.5
            waitMultiplier = 1
            timeKeyDecimals = 6

            [[track]]
            index = 0
            instrument = "X"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_tokens, 10);
        assert_eq!(config.output_file, PathBuf::from("a.txt"));
        assert_eq!(config.pitch_shift, -3);
        assert_eq!(config.wait_compensation, 1.5);
        assert_eq!(config.time_key_decimals, Some(6));
    }

    #[test]
    fn test_missing_required_field() {
        let err = Config::from_toml_str(&BASIC.replace("bpm = 10000", "")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_delimiter_in_instrument() {
        let text = BASIC.replace("noteblock_bass", "bad|name");
        let err = Config::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_duplicate_track() {
        let text = BASIC.replace("index = 1", "index = 0");
        assert!(matches!(Config::from_toml_str(&text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_budget_and_negative_multiplier() {
        let zero = BASIC.replace("max_tokens = 500", "max_tokens = 0");
        assert!(matches!(Config::from_toml_str(&zero), Err(ConfigError::Invalid(_))));

        let negative = BASIC.replace("wait_multiplier = 0.1", "wait_multiplier = -1.0");
        assert!(matches!(Config::from_toml_str(&negative), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_empty_track_list() {
        let text = r#"
            midi_file = "song.mid"
            max_tokens = 5
            bpm = 100
            ignored_delta_cutoff = 0
            pitch_shift = 0
            wait_compensation = 0
            wait_multiplier = 1
            track = []
        "#;
        assert!(matches!(Config::from_toml_str(text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_resolves_midi_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notescript.toml");
        std::fs::write(&path, BASIC).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.midi_file, dir.path().join("song.mid"));
        // Output stays relative to the working directory
        assert_eq!(config.output_file, PathBuf::from("out.🗿"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/no/such/notescript.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let path = locate_config(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("custom.toml"));
    }
}
