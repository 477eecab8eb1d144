//! Analyzer accumulator (spec §3): three spectrum accumulators (FF, FB,
//! SPK), a primary-path accumulator, and a running FFT-pass count.

use anc_core::FFT_BINS;
use num_complex::Complex64;

#[derive(Debug, Clone)]
pub struct SpectrumAccumulator {
    pub ff: Vec<Complex64>,
    pub fb: Vec<Complex64>,
    pub spk: Vec<Complex64>,
    pub pp: Vec<Complex64>,
    /// Number of FFT passes folded in so far. Invariant: `count <= N_AVG`.
    pub count: usize,
}

impl SpectrumAccumulator {
    pub fn new() -> Self {
        Self {
            ff: vec![Complex64::new(0.0, 0.0); FFT_BINS],
            fb: vec![Complex64::new(0.0, 0.0); FFT_BINS],
            spk: vec![Complex64::new(0.0, 0.0); FFT_BINS],
            pp: vec![Complex64::new(0.0, 0.0); FFT_BINS],
            count: 0,
        }
    }

    pub fn reset(&mut self) {
        for buf in [&mut self.ff, &mut self.fb, &mut self.spk, &mut self.pp] {
            buf.fill(Complex64::new(0.0, 0.0));
        }
        self.count = 0;
    }

    /// Fold one FFT pass's bin-wise spectra in (spec §4.4): accumulate
    /// `ff`/`fb`/`spk`, and the per-bin guarded ratio `P_k = FB_k/FF_k`
    /// into `pp`.
    pub fn accumulate(&mut self, ff: &[Complex64], fb: &[Complex64], spk: &[Complex64]) {
        for k in 0..FFT_BINS {
            self.ff[k] += ff[k];
            self.fb[k] += fb[k];
            self.spk[k] += spk[k];
            self.pp[k] += anc_dsp::complex::guarded_div(fb[k], ff[k]);
        }
        self.count += 1;
    }

    /// Divide every accumulator bin-wise by `count`, producing the
    /// averaged spectra and the primary-path estimate `PP` (spec §4.4).
    /// After this call `count` is the authoritative denominator already
    /// applied; callers should not average twice.
    pub fn average(&self) -> AveragedSpectra {
        let n = self.count.max(1) as f64;
        AveragedSpectra {
            ff_avg: self.ff.iter().map(|c| c / n).collect(),
            fb_avg: self.fb.iter().map(|c| c / n).collect(),
            spk_avg: self.spk.iter().map(|c| c / n).collect(),
            pp: self.pp.iter().map(|c| c / n).collect(),
        }
    }
}

impl Default for SpectrumAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct AveragedSpectra {
    pub ff_avg: Vec<Complex64>,
    pub fb_avg: Vec<Complex64>,
    pub spk_avg: Vec<Complex64>,
    pub pp: Vec<Complex64>,
}
