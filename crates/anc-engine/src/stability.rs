//! Stability gate (C6, spec §4.6): four sequential checks over the
//! 200-1000 Hz band of `W_target` in dB; any failure rejects the
//! iteration.

use anc_core::{FFT_BINS, R_DSP};
use anc_dsp::complex::freq_bin;
use num_complex::Complex64;

pub const BAND_LO_HZ: f64 = 200.0;
pub const BAND_HI_HZ: f64 = 1000.0;
pub const DB_FLOOR: f64 = 1e-8;
pub const SMOOTHNESS_FACTOR: f64 = 3.0;
pub const SMOOTHNESS_EPSILON: f64 = 1e-8;
pub const SPIKE_THRESHOLD_DB: f64 = 6.0;
pub const SPIKE_FRACTION: f64 = 0.10;
pub const MIN_DB: f64 = -40.0;
pub const MAX_DB: f64 = 10.0;
pub const GLOBAL_SHIFT_DB: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    Smoothness,
    LocalSpikes,
    AbsoluteBounds,
    GlobalShift,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Accept { smoothness: f64 },
    Reject(RejectReason),
}

/// Persistent stability-gate state: the previous iteration's full-spectrum
/// dB magnitude and smoothness score (spec §3 `Adaptation state`).
pub struct StabilityGate {
    prev_h_db: Vec<f64>,
    prev_smoothness: f64,
    k_lo: usize,
    k_hi: usize,
}

impl StabilityGate {
    pub fn new() -> Self {
        Self {
            prev_h_db: vec![0.0; FFT_BINS],
            prev_smoothness: 1.0,
            k_lo: freq_bin(BAND_LO_HZ, R_DSP, FFT_BINS),
            k_hi: freq_bin(BAND_HI_HZ, R_DSP, FFT_BINS),
        }
    }

    /// Evaluate `w_target` without mutating state; callers must call
    /// [`Self::commit`] themselves on [`Verdict::Accept`] so that
    /// `prev_target_ff`/`prev_smoothness` update iff and only iff the
    /// check passes (spec §8 stability-commit atomicity).
    pub fn evaluate(&self, w_target: &[Complex64]) -> (Verdict, Vec<f64>) {
        let h_db: Vec<f64> = w_target
            .iter()
            .map(|w| 20.0 * (w.norm() + DB_FLOOR).log10())
            .collect();
        let band: Vec<f64> = h_db[self.k_lo..=self.k_hi].to_vec();
        let prev_band: Vec<f64> = self.prev_h_db[self.k_lo..=self.k_hi].to_vec();

        // 1. Smoothness.
        let s_cur = if band.len() >= 3 {
            let mut sum = 0.0;
            let mut n = 0usize;
            for i in 0..band.len() - 2 {
                let d = band[i + 2] - 2.0 * band[i + 1] + band[i];
                sum += d * d;
                n += 1;
            }
            sum / n.max(1) as f64
        } else {
            0.0
        };
        if s_cur > SMOOTHNESS_FACTOR * self.prev_smoothness && self.prev_smoothness > SMOOTHNESS_EPSILON {
            return (Verdict::Reject(RejectReason::Smoothness), h_db);
        }

        // 2. Local spikes.
        let spike_count = band
            .iter()
            .zip(&prev_band)
            .filter(|(cur, prev)| (*cur - *prev).abs() > SPIKE_THRESHOLD_DB)
            .count();
        if (spike_count as f64) > SPIKE_FRACTION * band.len() as f64 {
            return (Verdict::Reject(RejectReason::LocalSpikes), h_db);
        }

        // 3. Absolute bounds.
        let min_db = band.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_db = band.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min_db < MIN_DB || max_db > MAX_DB {
            return (Verdict::Reject(RejectReason::AbsoluteBounds), h_db);
        }

        // 4. Global shift.
        let mean_shift: f64 = band
            .iter()
            .zip(&prev_band)
            .map(|(cur, prev)| cur - prev)
            .sum::<f64>()
            / band.len() as f64;
        if mean_shift.abs() > GLOBAL_SHIFT_DB {
            return (Verdict::Reject(RejectReason::GlobalShift), h_db);
        }

        (Verdict::Accept { smoothness: s_cur }, h_db)
    }

    /// Commit `prev_smoothness`/`prev_h_db` after an [`Verdict::Accept`].
    pub fn commit(&mut self, smoothness: f64, h_db: Vec<f64>) {
        self.prev_smoothness = smoothness;
        self.prev_h_db = h_db;
    }
}

impl Default for StabilityGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spectrum(db: f64) -> Vec<Complex64> {
        let mag = 10f64.powf(db / 20.0);
        vec![Complex64::new(mag, 0.0); FFT_BINS]
    }

    #[test]
    fn flat_spectrum_passes_on_first_iteration() {
        let gate = StabilityGate::new();
        let (verdict, _) = gate.evaluate(&flat_spectrum(0.0));
        assert!(matches!(verdict, Verdict::Accept { .. }));
    }

    #[test]
    fn spike_within_band_is_rejected() {
        let gate = StabilityGate::new();
        let mut spectrum = flat_spectrum(0.0);
        let spike_bin = freq_bin(500.0, R_DSP, FFT_BINS);
        spectrum[spike_bin] = Complex64::new(10f64.powf(20.0 / 20.0), 0.0);
        let (verdict, _) = gate.evaluate(&spectrum);
        assert!(matches!(
            verdict,
            Verdict::Reject(RejectReason::LocalSpikes) | Verdict::Reject(RejectReason::Smoothness)
        ));
    }

    #[test]
    fn absolute_bounds_reject_excessive_gain() {
        // Ramp the committed baseline up gradually so only the absolute
        // bound (not the spike or global-shift checks) fires at the end.
        let mut gate = StabilityGate::new();
        for db in [4.0, 8.0] {
            let (verdict, h_db) = gate.evaluate(&flat_spectrum(db));
            match verdict {
                Verdict::Accept { smoothness } => gate.commit(smoothness, h_db),
                other => panic!("expected ramp step to pass, got {other:?}"),
            }
        }
        let (verdict, _) = gate.evaluate(&flat_spectrum(10.5));
        assert_eq!(verdict, Verdict::Reject(RejectReason::AbsoluteBounds));
    }

    #[test]
    fn commit_is_only_applied_by_caller() {
        let mut gate = StabilityGate::new();
        let (verdict, h_db) = gate.evaluate(&flat_spectrum(0.0));
        if let Verdict::Accept { smoothness } = verdict {
            gate.commit(smoothness, h_db);
        }
        assert_eq!(gate.prev_smoothness, 0.0);
    }
}
