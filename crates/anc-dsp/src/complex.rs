//! Complex arithmetic and real-FFT helpers for the block-rate analyzer
//! (spec §4.1).
//!
//! Complex add/sub/mul are the plain `num_complex::Complex64` operators;
//! division is guarded here because the analyzer divides spectra by each
//! other (`P_k = FB_k / FF_k`) and a near-silent reference bin must not
//! produce an infinite or NaN primary-path estimate.

use anc_core::FFT_LEN;
use num_complex::Complex64;
use realfft::RealFftPlanner;
use std::sync::Arc;

/// Minimum magnitude-squared denominator used by [`guarded_div`].
pub const DIV_EPSILON: f64 = 1e-10;

/// Complex division with the denominator's magnitude-squared floored at
/// `DIV_EPSILON`, so a near-zero reference spectrum bin yields a bounded
/// result rather than `inf`/`NaN` (spec §4.1).
#[inline]
pub fn guarded_div(num: Complex64, den: Complex64) -> Complex64 {
    let denom_mag_sq = (den.re * den.re + den.im * den.im).max(DIV_EPSILON);
    let conj = den.conj();
    Complex64::new(
        (num.re * conj.re - num.im * conj.im) / denom_mag_sq,
        (num.re * conj.im + num.im * conj.re) / denom_mag_sq,
    )
}

/// Precomputed Blackman window of length `FFT_LEN`, coefficients
/// `(0.42, -0.5, 0.08)` (spec §4.1).
#[derive(Debug, Clone)]
pub struct BlackmanWindow {
    coeffs: Vec<f64>,
}

impl BlackmanWindow {
    pub fn new(len: usize) -> Self {
        let coeffs = (0..len)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / (len - 1).max(1) as f64;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();
        Self { coeffs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Apply the window in place: `out[i] = samples[i] * coeffs[i]`.
    pub fn apply(&self, samples: &[f64], out: &mut [f64]) {
        for ((o, &s), &w) in out.iter_mut().zip(samples).zip(&self.coeffs) {
            *o = s * w;
        }
    }
}

/// Real-to-complex FFT of length `FFT_LEN`, producing `FFT_BINS` bins
/// (spec §4.1). Wraps a `realfft` plan plus scratch buffers so a windowed
/// block can be transformed without further allocation.
pub struct RealSpectrum {
    fft: Arc<dyn realfft::RealToComplex<f64>>,
    scratch: Vec<f64>,
}

impl RealSpectrum {
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(len);
        Self {
            fft,
            scratch: vec![0.0; len],
        }
    }

    /// Transform a windowed time-domain block of length `FFT_LEN` into
    /// `bins` (length `FFT_BINS`). `windowed` is consumed by the transform
    /// via an internal scratch copy, so callers keep ownership of their
    /// buffer.
    pub fn forward(&mut self, windowed: &[f64], bins: &mut [Complex64]) {
        self.scratch.copy_from_slice(windowed);
        let _ = self.fft.process(&mut self.scratch, bins);
    }
}

/// Frequency in Hz of FFT bin `k`, for an `FFT_LEN`-point transform at
/// `sample_rate`.
#[inline]
pub fn bin_freq(k: usize, sample_rate: f64) -> f64 {
    k as f64 * sample_rate / FFT_LEN as f64
}

/// Nearest FFT bin for frequency `freq_hz`, clamped into `[0, FFT_BINS)`.
#[inline]
pub fn freq_bin(freq_hz: f64, sample_rate: f64, max_bin: usize) -> usize {
    let k = (freq_hz * FFT_LEN as f64 / sample_rate).round();
    (k.max(0.0) as usize).min(max_bin.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_core::{FFT_BINS, R_DSP};
    use approx::assert_relative_eq;

    #[test]
    fn guarded_div_handles_near_zero_denominator() {
        let num = Complex64::new(1.0, 0.0);
        let den = Complex64::new(1e-12, 0.0);
        let r = guarded_div(num, den);
        assert!(r.re.is_finite());
        assert!(r.im.is_finite());
    }

    #[test]
    fn guarded_div_matches_plain_division_away_from_zero() {
        let num = Complex64::new(3.0, -2.0);
        let den = Complex64::new(1.0, 1.0);
        let r = guarded_div(num, den);
        let expected = num / den;
        assert_relative_eq!(r.re, expected.re, epsilon = 1e-9);
        assert_relative_eq!(r.im, expected.im, epsilon = 1e-9);
    }

    #[test]
    fn blackman_window_endpoints_taper_to_zero() {
        let w = BlackmanWindow::new(2048);
        let samples = vec![1.0; 2048];
        let mut out = vec![0.0; 2048];
        w.apply(&samples, &mut out);
        assert!(out[0].abs() < 1e-6);
        assert!(out[2047].abs() < 1e-2);
        assert!(out[1024] > 0.9);
    }

    #[test]
    fn real_spectrum_of_dc_block_concentrates_in_bin_zero() {
        let mut spectrum = RealSpectrum::new(2048);
        let samples = vec![1.0; 2048];
        let mut bins = vec![Complex64::new(0.0, 0.0); FFT_BINS];
        spectrum.forward(&samples, &mut bins);
        assert!(bins[0].norm() > bins[10].norm());
    }

    #[test]
    fn bin_freq_and_freq_bin_round_trip() {
        let k = 100;
        let f = bin_freq(k, R_DSP);
        let back = freq_bin(f, R_DSP, FFT_BINS);
        assert_eq!(back, k);
    }
}
