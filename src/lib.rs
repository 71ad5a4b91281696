// notescript - MIDI to pipe-delimited note script converter
// Main library entry point

pub mod cli;
pub mod config;
pub mod midi;
pub mod output;
pub mod script;

use anyhow::Context;
use std::io::Write;

use cli::CliArgs;
use config::Config;
use output::Summary;

/// Initialize env_logger, honoring RUST_LOG over the default level
pub fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Resolve the config for a command line: locate, load, apply overrides, validate
pub fn load_config(args: &CliArgs) -> anyhow::Result<Config> {
    let path = config::locate_config(args.config.as_deref()).context("Locating config")?;
    let mut config = Config::load(&path)
        .with_context(|| format!("Loading config {}", path.display()))?;

    if let Some(midi) = &args.midi {
        config.midi_file = midi.clone();
    }
    if let Some(out) = &args.out {
        config.output_file = out.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    config.validate().context("Applying command-line overrides")?;

    Ok(config)
}

/// Run one conversion: parse the MIDI file, convert, report to `out`, write the artifact
pub fn convert_file<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<Summary> {
    let midi = midi::read_midi_file(&config.midi_file)
        .with_context(|| format!("Parsing MIDI file {}", config.midi_file.display()))?;

    let conversion = script::convert(&midi, config).context("Converting tracks")?;
    let script = conversion.script();
    let summary = Summary::of(&conversion);

    output::print_report(out, &script, &summary).context("Printing report")?;
    output::write_script(&config.output_file, &script)
        .with_context(|| format!("Writing output {}", config.output_file.display()))?;

    log::info!(
        "Converted {} tracks into {} parts ({} dropped by budget)",
        config.tracks.len(),
        summary.parts,
        conversion.dropped
    );

    Ok(summary)
}

/// Entry point for the notescript binary
pub fn run(args: &CliArgs) -> anyhow::Result<Summary> {
    let config = load_config(args)?;
    let stdout = std::io::stdout();
    convert_file(&config, &mut stdout.lock())
}
