// Command-line arguments for the notescript binary

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  notescript [OPTIONS]

Options:
  --config <path>       Config file (default: ./notescript.toml, then the user config dir)
  --midi <path>         Override the config's midi_file
  --out <path>          Override the config's output_file
  --max-tokens <n>      Override the config's max_tokens
  --verbose             Debug logging
  --help                Show this help";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CliError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {flag}: '{value}'")]
    InvalidValue { flag: String, value: String },

    #[error("Unknown argument: {0}")]
    Unknown(String),
}

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub midi: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub max_tokens: Option<usize>,
    pub verbose: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut parsed = CliArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--verbose" => parsed.verbose = true,
                "--help" | "-h" => parsed.help = true,
                "--config" => parsed.config = Some(PathBuf::from(value_for(arg, iter.next())?)),
                "--midi" => parsed.midi = Some(PathBuf::from(value_for(arg, iter.next())?)),
                "--out" => parsed.out = Some(PathBuf::from(value_for(arg, iter.next())?)),
                "--max-tokens" => {
                    let value = value_for(arg, iter.next())?;
                    let n = value.parse::<usize>().map_err(|_| CliError::InvalidValue {
                        flag: arg.clone(),
                        value: value.to_string(),
                    })?;
                    parsed.max_tokens = Some(n);
                }
                other => return Err(CliError::Unknown(other.to_string())),
            }
        }

        Ok(parsed)
    }
}

fn value_for<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, CliError> {
    value
        .map(String::as_str)
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}
