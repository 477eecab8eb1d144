//! Built-in secondary-path preset table (spec §6).
//!
//! Each preset supplies the secondary-path spectrum `S` (used by the
//! stability gate and the `mu_k` step-size formula) and the initial
//! `BiquadParam` values the feedforward cascade is seeded with when that
//! preset is selected. Only the first three presets model a distinct
//! acoustic transfer function; the remaining seven are placeholders —
//! flat unity spectrum, zero-gain flat cascade — documented here rather
//! than silently passed off as calibrated data (spec: "the preset tables
//! in source are partially populated with placeholder values").

use crate::biquad::{BiquadParam, FilterKind};
use anc_core::{FFT_BINS, NUM_BIQUADS, R_DSP};
use num_complex::Complex64;

pub const N_PRESETS: usize = 10;

/// One entry of the preset table: a length-`FFT_BINS` complex secondary
/// path spectrum plus the cascade's initial parameters.
#[derive(Debug, Clone)]
pub struct SecondaryPathPreset {
    pub name: &'static str,
    pub spectrum: Vec<Complex64>,
    pub initial_sections: [BiquadParam; NUM_BIQUADS],
    pub total_gain_db: f64,
    /// True for presets not yet backed by a measured impulse response.
    pub is_placeholder: bool,
}

fn flat_spectrum() -> Vec<Complex64> {
    vec![Complex64::new(1.0, 0.0); FFT_BINS]
}

fn flat_sections(default_fc: f64) -> [BiquadParam; NUM_BIQUADS] {
    [BiquadParam::new(FilterKind::Peaking, 0.0, 0.707, default_fc); NUM_BIQUADS]
}

/// Single-pole lowpass magnitude response `|S_k| = 1 / sqrt(1 + (f/fc)^2)`,
/// zero phase. A simple analytic stand-in for a rolled-off loudspeaker.
fn single_pole_lowpass_spectrum(fc: f64) -> Vec<Complex64> {
    (0..FFT_BINS)
        .map(|k| {
            let f = k as f64 * R_DSP / (2.0 * (FFT_BINS as f64 - 1.0));
            let mag = 1.0 / (1.0 + (f / fc).powi(2)).sqrt();
            Complex64::new(mag, 0.0)
        })
        .collect()
}

/// Single-pole highpass magnitude response, complementary to
/// [`single_pole_lowpass_spectrum`].
fn single_pole_highpass_spectrum(fc: f64) -> Vec<Complex64> {
    (0..FFT_BINS)
        .map(|k| {
            let f = k as f64 * R_DSP / (2.0 * (FFT_BINS as f64 - 1.0));
            let ratio = f / fc;
            let mag = ratio / (1.0 + ratio.powi(2)).sqrt();
            Complex64::new(mag, 0.0)
        })
        .collect()
}

/// Build the full `N_PRESETS`-entry preset table (spec §6).
pub fn preset_table() -> [SecondaryPathPreset; N_PRESETS] {
    [
        SecondaryPathPreset {
            name: "direct-unity",
            spectrum: flat_spectrum(),
            initial_sections: flat_sections(1000.0),
            total_gain_db: 0.0,
            is_placeholder: false,
        },
        SecondaryPathPreset {
            name: "small-driver-lowpass-4k",
            spectrum: single_pole_lowpass_spectrum(4000.0),
            initial_sections: flat_sections(2000.0),
            total_gain_db: 0.0,
            is_placeholder: false,
        },
        SecondaryPathPreset {
            name: "ported-enclosure-highpass-80",
            spectrum: single_pole_highpass_spectrum(80.0),
            initial_sections: flat_sections(200.0),
            total_gain_db: 0.0,
            is_placeholder: false,
        },
        placeholder("preset-04"),
        placeholder("preset-05"),
        placeholder("preset-06"),
        placeholder("preset-07"),
        placeholder("preset-08"),
        placeholder("preset-09"),
        placeholder("preset-10"),
    ]
}

fn placeholder(name: &'static str) -> SecondaryPathPreset {
    SecondaryPathPreset {
        name,
        spectrum: flat_spectrum(),
        initial_sections: flat_sections(1000.0),
        total_gain_db: 0.0,
        is_placeholder: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_n_presets_entries() {
        let table = preset_table();
        assert_eq!(table.len(), N_PRESETS);
    }

    #[test]
    fn every_spectrum_has_fft_bins_length() {
        for preset in preset_table() {
            assert_eq!(preset.spectrum.len(), FFT_BINS);
        }
    }

    #[test]
    fn placeholders_are_flagged() {
        let table = preset_table();
        assert!(!table[0].is_placeholder);
        assert!(!table[1].is_placeholder);
        assert!(!table[2].is_placeholder);
        assert!(table[3..].iter().all(|p| p.is_placeholder));
    }

    #[test]
    fn lowpass_preset_rolls_off_above_cutoff() {
        let table = preset_table();
        let lp = &table[1];
        assert!(lp.spectrum[5].norm() > lp.spectrum[FFT_BINS - 5].norm());
    }
}
