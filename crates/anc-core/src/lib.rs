//! anc-core: Shared types and utilities for the feedforward ANC adaptation core.
//!
//! This crate provides the foundational types used across `anc-dsp`,
//! `anc-engine`, `anc-io` and `anc-cli` — nothing in here depends on FFT,
//! biquad math, or the scheduler itself.

mod error;
mod sample;
mod time;

pub use error::*;
pub use sample::*;
pub use time::*;

/// The two realtime sample rates the adaptation core straddles.
///
/// The block-rate analyzer and everything downstream of it (target
/// synthesis, stability gate, optimizer) operate at `R_DSP`; the realtime
/// filter bridge materializes coefficients for and steps samples at
/// `R_RT`. Both use the same `(gain, Q, fc)` parameters — only the
/// resulting `(b, a)` differ (spec §4.2).
pub const R_DSP: f64 = 32_000.0;
pub const R_RT: f64 = 375_000.0;

/// FFT length used by the block-rate analyzer.
pub const FFT_LEN: usize = 2048;
/// Number of real-FFT bins for `FFT_LEN` (`FFT_LEN / 2 + 1`).
pub const FFT_BINS: usize = FFT_LEN / 2 + 1;
/// Number of biquad sections in the feedforward cascade.
pub const NUM_BIQUADS: usize = 10;
/// Windowed FFTs averaged per analyzer iteration.
pub const N_AVG: usize = 10;
/// Realtime frame period.
pub const FRAME_PERIOD_MS: f64 = 5.0;
/// Overlap fraction between successive analysis windows.
pub const OVERLAP: f64 = 0.75;

/// Decibel value wrapper, used for gain/EQ parameters throughout the cascade.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const NEG_INF: Self = Self(f64::NEG_INFINITY);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        if gain <= 0.0 {
            Self::NEG_INF
        } else {
            Self(20.0 * gain.log10())
        }
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decibels_round_trip() {
        let d = Decibels(6.0);
        let gain = d.to_gain();
        let back = Decibels::from_gain(gain);
        assert!((back.0 - 6.0).abs() < 1e-9);
    }
}
