//! Target synthesizer (C5, spec §4.5): per-bin step size `mu` and target
//! frequency response `W_target`.

use anc_core::FFT_BINS;
use anc_dsp::biquad::FeedforwardFilter;
use num_complex::Complex64;

pub const MU_MAX: f64 = 0.1;
pub const MU_MIN: f64 = 1e-4;
pub const EPSILON_0: f64 = 1e-6;
pub const S_FLOOR: f64 = 1e-8;

/// Guard a secondary-path spectrum bin: if `|S_k| < S_FLOOR`, replace it
/// with `S_FLOOR * (cos phi, sin phi)`, preserving phase while
/// floor-limiting magnitude (spec §4.5).
pub fn guard_secondary_path(s: Complex64) -> Complex64 {
    if s.norm() < S_FLOOR {
        let phi = s.im.atan2(s.re);
        Complex64::new(S_FLOOR * phi.cos(), S_FLOOR * phi.sin())
    } else {
        s
    }
}

/// Per-bin step size `mu_k = mu_max / (|S_k|^2 * |FF_k|^2 + eps0)`, clamped
/// to `[MU_MIN, MU_MAX]` (spec §4.5).
pub fn step_size(s_k: Complex64, ff_k: Complex64) -> f64 {
    let s_mag2 = s_k.norm_sqr();
    let ff_mag2 = ff_k.norm_sqr();
    (MU_MAX / (s_mag2 * ff_mag2 + EPSILON_0)).clamp(MU_MIN, MU_MAX)
}

/// Synthesize `W_target` for every bin (spec §4.5):
/// `W_target,k = W_current,k + mu_k * (PP_k / S_k)`.
pub fn synthesize_target(
    ff_avg: &[Complex64],
    pp: &[Complex64],
    secondary_spectrum: &[Complex64],
    current_filter: &FeedforwardFilter,
    sample_rate: f64,
    fft_len: usize,
) -> Vec<Complex64> {
    let w_current = current_filter.spectrum_response(sample_rate, fft_len, FFT_BINS);
    (0..FFT_BINS)
        .map(|k| {
            let s_k = guard_secondary_path(secondary_spectrum[k]);
            let mu_k = step_size(s_k, ff_avg[k]);
            w_current[k] + anc_dsp::complex::guarded_div(pp[k], s_k) * mu_k
        })
        .collect()
}
