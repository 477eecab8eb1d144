//! Multichannel PCM WAV input/output (spec §6), grounded on the teacher's
//! `hound`-based `read_wav`/`write_wav` (`rf-file/src/audio_file.rs`),
//! narrowed to this system's two-channel FF/FB contract: channel 0 = FF,
//! channel 1 = FB, both 16- and 32-bit linear PCM decoded to `[-1, 1]` f64.
//!
//! On a missing or malformed input file this degrades to the documented
//! fallback (spec §6/§7): 10 s of synthesized test tones, 1 kHz on FF at
//! amplitude 1e-3, 2 kHz on FB at 5e-4, both at `R_RT`.

use std::f64::consts::PI;
use std::path::Path;

use anc_core::R_RT;

use crate::error::{IoError, IoResult};

/// Deinterleaved FF/FB streams plus the sample rate they were captured at.
#[derive(Debug, Clone)]
pub struct InputStreams {
    pub ff: Vec<f64>,
    pub fb: Vec<f64>,
    pub sample_rate: u32,
}

const FALLBACK_DURATION_S: f64 = 10.0;
const FALLBACK_FF_FREQ_HZ: f64 = 1000.0;
const FALLBACK_FF_AMPLITUDE: f64 = 1e-3;
const FALLBACK_FB_FREQ_HZ: f64 = 2000.0;
const FALLBACK_FB_AMPLITUDE: f64 = 5e-4;

/// Read a multichannel WAV file, returning the FF/FB streams. Falls back
/// to [`synthetic_test_tones`] (with a `warn!` log) when the path is
/// absent, unreadable, or carries fewer than two channels or an
/// unsupported bit depth/format.
pub fn read_input<P: AsRef<Path>>(path: Option<P>) -> InputStreams {
    let Some(path) = path else {
        log::warn!("no input WAV configured, synthesizing fallback test tones");
        return synthetic_test_tones();
    };
    match try_read_input(path.as_ref()) {
        Ok(streams) => streams,
        Err(err) => {
            log::warn!("failed to read input WAV {}: {err}, falling back to synthetic test tones", path.as_ref().display());
            synthetic_test_tones()
        }
    }
}

fn try_read_input(path: &Path) -> IoResult<InputStreams> {
    if !path.exists() {
        return Err(IoError::NotFound(path.display().to_string()));
    }
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels < 2 {
        return Err(IoError::MissingChannel(num_channels));
    }

    let samples: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader.samples::<f32>().map(|s| s.map(|v| v as f64)).collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f64 / i16::MAX as f64))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f64 / i32::MAX as f64))
            .collect::<Result<_, _>>()?,
        (_, bits) => return Err(IoError::UnsupportedBitDepth(bits)),
    };

    let num_frames = samples.len() / num_channels;
    let mut ff = vec![0.0; num_frames];
    let mut fb = vec![0.0; num_frames];
    for (i, chunk) in samples.chunks(num_channels).enumerate().take(num_frames) {
        ff[i] = chunk[0];
        fb[i] = chunk[1];
    }

    Ok(InputStreams {
        ff,
        fb,
        sample_rate: spec.sample_rate,
    })
}

/// 10 s of synthesized test tones at `R_RT`: 1 kHz on FF at 1e-3, 2 kHz on
/// FB at 5e-4 (spec §6 fallback).
pub fn synthetic_test_tones() -> InputStreams {
    let n = (R_RT * FALLBACK_DURATION_S).round() as usize;
    let mut ff = Vec::with_capacity(n);
    let mut fb = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 / R_RT;
        ff.push(FALLBACK_FF_AMPLITUDE * (2.0 * PI * FALLBACK_FF_FREQ_HZ * t).sin());
        fb.push(FALLBACK_FB_AMPLITUDE * (2.0 * PI * FALLBACK_FB_FREQ_HZ * t).sin());
    }
    InputStreams {
        ff,
        fb,
        sample_rate: R_RT as u32,
    }
}

/// Write the original FF and residual FB as a 2-channel 16-bit PCM WAV at
/// `sample_rate` (spec §6).
pub fn write_output<P: AsRef<Path>>(path: P, ff: &[f64], fb: &[f64], sample_rate: u32) -> IoResult<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let n = ff.len().min(fb.len());
    for i in 0..n {
        writer.write_sample(to_i16(ff[i]))?;
        writer.write_sample(to_i16(fb[i]))?;
    }
    writer.finalize()?;
    Ok(())
}

#[inline]
fn to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}
