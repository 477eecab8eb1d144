//! anc-cli: command-line wiring for the feedforward ANC adaptation core
//! (spec §6) — parses arguments, initializes logging, reads the input WAV
//! (or synthesizes the fallback test tones), loads the secondary-path
//! preset and impulse response, drives `anc_engine::Session` to
//! completion, and writes the output WAV and iteration log.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use anc_dsp::presets::{preset_table, N_PRESETS};
use anc_engine::Session;
use anc_io::{log::IterationLog, wav, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "anc-cli", about = "Feedforward ANC adaptation core")]
struct Cli {
    /// Input WAV path (channel 0 = FF, channel 1 = FB). If omitted,
    /// synthesizes 10s of fallback test tones.
    #[arg(short, long)]
    input: Option<String>,

    /// Output WAV path (2-channel 16-bit PCM: original FF, residual FB).
    #[arg(short, long, default_value = "output.wav")]
    output: String,

    /// Secondary-path preset index (0..N_PRESETS).
    #[arg(short, long, default_value_t = 0)]
    preset: usize,

    /// Secondary-path impulse response binary path (little-endian f32
    /// taps). If omitted, falls back to an exponential-decay model.
    #[arg(long)]
    impulse_response: Option<String>,

    /// Iteration log path. Always mirrored to stdout regardless.
    #[arg(long)]
    log: Option<String>,

    /// Cap the number of adaptation iterations processed.
    #[arg(long)]
    max_iterations: Option<usize>,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            preset_index: self.preset,
            input_wav: self.input,
            output_wav: self.output,
            impulse_response: self.impulse_response,
            log_path: self.log,
            max_iterations: self.max_iterations,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse().into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: RunConfig) -> Result<()> {
    if config.preset_index >= N_PRESETS {
        bail!("preset index {} out of range (0..{N_PRESETS})", config.preset_index);
    }

    let table = preset_table();
    let preset = &table[config.preset_index];
    if preset.is_placeholder {
        log::warn!("preset '{}' is a placeholder (flat unity response); mu computations will not reflect a real acoustic transfer function", preset.name);
    }

    let streams = wav::read_input(config.input_wav.as_deref());
    let sample_rate = streams.sample_rate;
    let secondary_ir = anc_io::ir::load_impulse_response(config.impulse_response.as_deref());

    let mut session = Session::new(streams.ff, streams.fb, preset, &secondary_ir)
        .context("failed to allocate adaptation session")?;

    let mut log_sink = IterationLog::open(config.log.as_deref()).context("failed to open iteration log")?;

    let mut reports = session.run();
    if let Some(max) = config.max_iterations {
        reports.truncate(max);
    }
    for report in &reports {
        log_sink.record(report, None).context("failed to write iteration log record")?;
    }
    log_sink.flush().context("failed to flush iteration log")?;

    wav::write_output(&config.output_wav, session.ff(), session.fb(), sample_rate)
        .context("failed to write output WAV")?;

    log::info!(
        "completed {} iteration(s), preset '{}', output written to {}",
        reports.len(),
        preset.name,
        config.output_wav
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn run_with_short_input_writes_output_file() {
        // A 0.325s (one iteration window) input keeps this test's runtime
        // bounded instead of exercising the full 10s synthetic fallback.
        let input = NamedTempFile::new().unwrap();
        let n = (anc_core::R_RT * 0.325).round() as usize;
        wav::write_output(input.path(), &vec![0.0; n], &vec![0.0; n], anc_core::R_RT as u32).unwrap();

        let output = NamedTempFile::new().unwrap();
        let output_path = output.path().to_str().unwrap().to_string();

        let config = RunConfig {
            preset_index: 0,
            input_wav: Some(input.path().to_str().unwrap().to_string()),
            output_wav: output_path.clone(),
            impulse_response: None,
            log_path: None,
            max_iterations: Some(1),
        };

        run(config).unwrap();
        assert!(std::path::Path::new(&output_path).metadata().unwrap().len() > 0);
    }

    #[test]
    fn out_of_range_preset_index_is_rejected() {
        let config = RunConfig {
            preset_index: 999,
            input_wav: None,
            output_wav: "unused.wav".into(),
            impulse_response: None,
            log_path: None,
            max_iterations: Some(0),
        };
        assert!(run(config).is_err());
    }
}
