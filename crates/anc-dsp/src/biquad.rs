//! Biquad filter math: RBJ coefficient synthesis, cascade frequency
//! response, and the Direct-Form-II-Transposed sample stepper (spec §4.2).
//!
//! Three filter types are modeled, matching the feedforward cascade's
//! `BiquadParam` entity: `LowShelf`, `Peaking`, `HighShelf`. Each carries
//! `gain_dB`, `Q` and `fc`, clamped to the hard parameter bounds the EQ
//! optimizer (`anc-engine`) must respect at every step.

use anc_core::NUM_BIQUADS;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::{MonoProcessor, Processor, ProcessorConfig};

/// Hard parameter bounds, shared by validation and the optimizer's box
/// constraints.
pub const GAIN_DB_RANGE: (f64, f64) = (-20.0, 20.0);
pub const Q_RANGE: (f64, f64) = (0.3, 10.0);
pub const FC_RANGE: (f64, f64) = (20.0, 20_000.0);
pub const TOTAL_GAIN_DB_RANGE: (f64, f64) = (-10.0, 10.0);

/// The three biquad types the cascade is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowShelf,
    Peaking,
    HighShelf,
}

/// A single biquad section's parameters. Invariants (spec §3):
/// `gain_dB ∈ [-20, 20]`, `Q ∈ [0.3, 10]`, `fc ∈ [20, 20000]`.
#[derive(Debug, Clone, Copy)]
pub struct BiquadParam {
    pub kind: FilterKind,
    pub gain_db: f64,
    pub q: f64,
    pub fc: f64,
}

impl BiquadParam {
    pub fn new(kind: FilterKind, gain_db: f64, q: f64, fc: f64) -> Self {
        Self {
            kind,
            gain_db: gain_db.clamp(GAIN_DB_RANGE.0, GAIN_DB_RANGE.1),
            q: q.clamp(Q_RANGE.0, Q_RANGE.1),
            fc: fc.clamp(FC_RANGE.0, FC_RANGE.1),
        }
    }

    /// True iff every field is within its box. The constructor already
    /// clamps, so this holds for any `BiquadParam` built through it; kept
    /// as an explicit check for the optimizer's boundary tests.
    pub fn in_bounds(&self) -> bool {
        (GAIN_DB_RANGE.0..=GAIN_DB_RANGE.1).contains(&self.gain_db)
            && (Q_RANGE.0..=Q_RANGE.1).contains(&self.q)
            && (FC_RANGE.0..=FC_RANGE.1).contains(&self.fc)
    }

    /// Synthesize normalized (`a0 == 1`) coefficients at `sample_rate`
    /// using the RBJ audio-EQ cookbook formulas (spec §4.2).
    pub fn coeffs(&self, sample_rate: f64) -> BiquadCoeffs {
        let a = 10f64.powf(self.gain_db / 40.0);
        let omega0 = 2.0 * PI * self.fc / sample_rate;
        let (sin_w, cos_w) = omega0.sin_cos();
        let alpha = sin_w / (2.0 * self.q);

        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            FilterKind::Peaking => (
                1.0 + alpha * a,
                -2.0 * cos_w,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w,
                1.0 - alpha / a,
            ),
            FilterKind::LowShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
                    a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
                    (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha,
                )
            }
            FilterKind::HighShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w),
                    a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w),
                    (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha,
                )
            }
        };

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Normalized biquad coefficients (`a0` divided out, spec §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    pub fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Frequency response at digital frequency `omega` (radians/sample,
    /// `0..=PI`), per section (spec §4.2).
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b0 + self.b1 * z1 + self.b2 * z2;
        let den = 1.0 + self.a1 * z1 + self.a2 * z2;
        num / den
    }
}

/// Direct-Form-II-Transposed delay state for one biquad section.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    s1: f64,
    s2: f64,
}

impl BiquadState {
    /// Step one input sample through `coeffs` (spec §4.2: `y = b0*x + s1;
    /// s1' = b1*x - a1*y + s2; s2' = b2*x - a2*y`).
    #[inline]
    pub fn step(&mut self, coeffs: &BiquadCoeffs, x: f64) -> f64 {
        let y = coeffs.b0 * x + self.s1;
        self.s1 = coeffs.b1 * x - coeffs.a1 * y + self.s2;
        self.s2 = coeffs.b2 * x - coeffs.a2 * y;
        y
    }
}

/// The full `NUM_BIQUADS`-section feedforward cascade plus its broadband
/// gain stage (spec §3: `FeedforwardFilter`).
#[derive(Debug, Clone)]
pub struct FeedforwardFilter {
    pub sections: [BiquadParam; NUM_BIQUADS],
    pub total_gain_db: f64,
}

impl FeedforwardFilter {
    pub fn flat(default_fc: f64) -> Self {
        let section = BiquadParam::new(FilterKind::Peaking, 0.0, 0.707, default_fc);
        Self {
            sections: [section; NUM_BIQUADS],
            total_gain_db: 0.0,
        }
    }

    /// Complex frequency response of the cascade (all sections in series)
    /// times the broadband gain, at `freq_hz` for `sample_rate` (spec
    /// §4.2: "multiply them all; multiply the result by total_gain").
    pub fn response_at(&self, sample_rate: f64, freq_hz: f64) -> Complex64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        let gain = 10f64.powf(self.total_gain_db / 20.0);
        self.sections
            .iter()
            .fold(Complex64::new(gain, 0.0), |acc, section| {
                acc * section.coeffs(sample_rate).response(omega)
            })
    }

    /// Cascade response at every analysis bin `k = 0..K`, evaluated at
    /// `omega = 2*pi*k/L` against `sample_rate` (spec §4.2: "The cascade
    /// response at bin k uses ω = 2πk/L evaluated at the analysis rate
    /// R_dsp"). Used by the target synthesizer (C5) and the EQ optimizer's
    /// per-step loss (C7).
    pub fn spectrum_response(&self, sample_rate: f64, fft_len: usize, bins: usize) -> Vec<Complex64> {
        let coeffs = self.coeffs_at(sample_rate);
        let gain = 10f64.powf(self.total_gain_db / 20.0);
        (0..bins)
            .map(|k| {
                let omega = 2.0 * PI * k as f64 / fft_len as f64;
                coeffs.iter().fold(Complex64::new(gain, 0.0), |acc, c| acc * c.response(omega))
            })
            .collect()
    }

    /// Materialize per-section coefficients at `sample_rate`, for either
    /// analysis (`R_DSP`) or the realtime stepper (`R_RT`).
    pub fn coeffs_at(&self, sample_rate: f64) -> [BiquadCoeffs; NUM_BIQUADS] {
        let mut out = [BiquadCoeffs::default(); NUM_BIQUADS];
        for (slot, section) in out.iter_mut().zip(self.sections.iter()) {
            *slot = section.coeffs(sample_rate);
        }
        out
    }
}

/// Realtime cascade stepper: `NUM_BIQUADS` DF-II-T sections in series plus
/// the broadband gain, used by the filter bridge (spec §4.8).
#[derive(Debug, Clone)]
pub struct CascadeProcessor {
    coeffs: [BiquadCoeffs; NUM_BIQUADS],
    states: [BiquadState; NUM_BIQUADS],
    gain: f64,
    sample_rate: f64,
}

impl CascadeProcessor {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            coeffs: [BiquadCoeffs::bypass(); NUM_BIQUADS],
            states: [BiquadState::default(); NUM_BIQUADS],
            gain: 1.0,
            sample_rate,
        }
    }

    /// Replace the cascade's coefficients (rematerialized from a
    /// `FeedforwardFilter` at `self.sample_rate`). Filter memory carries
    /// over, matching the teacher convention that coefficient swaps alone
    /// never reset state (spec §4.8 / §4.9 `UPDATE_FILTER_COEFFS`).
    pub fn set_filter(&mut self, filter: &FeedforwardFilter) {
        self.coeffs = filter.coeffs_at(self.sample_rate);
        self.gain = 10f64.powf(filter.total_gain_db / 20.0);
    }
}

impl Processor for CascadeProcessor {
    fn reset(&mut self) {
        for state in &mut self.states {
            *state = BiquadState::default();
        }
    }
}

impl MonoProcessor for CascadeProcessor {
    #[inline]
    fn process_sample(&mut self, input: f64) -> f64 {
        let mut x = input * self.gain;
        for (coeffs, state) in self.coeffs.iter().zip(self.states.iter_mut()) {
            x = state.step(coeffs, x);
        }
        x
    }
}

impl ProcessorConfig for CascadeProcessor {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn peaking_zero_gain_is_flat() {
        let p = BiquadParam::new(FilterKind::Peaking, 0.0, 1.0, 1000.0);
        let c = p.coeffs(32_000.0);
        for k in [0usize, 100, 500, 1024] {
            let omega = 2.0 * PI * k as f64 / 2048.0;
            let r = c.response(omega);
            assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn low_shelf_dc_gain_matches_analytical() {
        let p = BiquadParam::new(FilterKind::LowShelf, 12.0, 0.707, 1000.0);
        let c = p.coeffs(32_000.0);
        let dc = c.response(0.0);
        let expected = 10f64.powf(12.0 / 20.0);
        assert_relative_eq!(dc.re, expected, epsilon = 1e-3);
        assert_relative_eq!(dc.im, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn stepper_bypass_passes_through() {
        let coeffs = BiquadCoeffs::bypass();
        let mut state = BiquadState::default();
        for x in [0.1, -0.3, 0.5, 0.0] {
            assert_relative_eq!(state.step(&coeffs, x), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn params_clamp_out_of_box_values() {
        let p = BiquadParam::new(FilterKind::Peaking, 100.0, 50.0, 50_000.0);
        assert_eq!(p.gain_db, GAIN_DB_RANGE.1);
        assert_eq!(p.q, Q_RANGE.1);
        assert_eq!(p.fc, FC_RANGE.1);
        assert!(p.in_bounds());
    }

    #[test]
    fn flat_cascade_is_unity_gain() {
        let filter = FeedforwardFilter::flat(1000.0);
        let r = filter.response_at(32_000.0, 2000.0);
        assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn spectrum_response_matches_pointwise_response() {
        let filter = FeedforwardFilter::flat(1000.0);
        let spectrum = filter.spectrum_response(32_000.0, 2048, 1025);
        let freq = crate::complex::bin_freq(100, 32_000.0);
        let pointwise = filter.response_at(32_000.0, freq);
        assert_relative_eq!(spectrum[100].re, pointwise.re, epsilon = 1e-9);
        assert_relative_eq!(spectrum[100].im, pointwise.im, epsilon = 1e-9);
    }

    #[test]
    fn cascade_processor_reset_clears_state() {
        let filter = FeedforwardFilter::flat(1000.0);
        let mut proc = CascadeProcessor::new(375_000.0);
        proc.set_filter(&filter);
        for _ in 0..50 {
            proc.process_sample(1.0);
        }
        proc.reset();
        assert_relative_eq!(proc.process_sample(0.0), 0.0, epsilon = 1e-12);
    }
}
