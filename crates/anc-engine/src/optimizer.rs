//! EQ optimizer (C7, spec §4.7): sequential coordinate-descent over the 31
//! scalar parameters (10 biquads * {gain, Q, fc} + total_gain_dB), with
//! per-step finite-difference gradient and monotone-loss acceptance.

use anc_core::FFT_BINS;
use anc_dsp::biquad::{FeedforwardFilter, FC_RANGE, GAIN_DB_RANGE, Q_RANGE, TOTAL_GAIN_DB_RANGE};
use num_complex::Complex64;

/// Which scalar of a `FeedforwardFilter` a coordinate-descent step touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    GainDb,
    Q,
    Fc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Biquad(usize, ParamField),
    TotalGainDb,
}

struct ParamSpec {
    epsilon: f64,
    eta: f64,
    delta_max: f64,
    bounds: (f64, f64),
}

fn spec_for(id: ParamId) -> ParamSpec {
    match id {
        ParamId::Biquad(_, ParamField::GainDb) => ParamSpec {
            epsilon: 0.01,
            eta: 0.1,
            delta_max: 2.0,
            bounds: GAIN_DB_RANGE,
        },
        ParamId::Biquad(_, ParamField::Q) => ParamSpec {
            epsilon: 0.001,
            eta: 0.01,
            delta_max: 0.2,
            bounds: Q_RANGE,
        },
        ParamId::Biquad(_, ParamField::Fc) => ParamSpec {
            epsilon: 1.0,
            eta: 10.0,
            delta_max: 100.0,
            bounds: FC_RANGE,
        },
        ParamId::TotalGainDb => ParamSpec {
            epsilon: 0.01,
            eta: 0.05,
            delta_max: 1.0,
            bounds: TOTAL_GAIN_DB_RANGE,
        },
    }
}

fn get(filter: &FeedforwardFilter, id: ParamId) -> f64 {
    match id {
        ParamId::Biquad(b, ParamField::GainDb) => filter.sections[b].gain_db,
        ParamId::Biquad(b, ParamField::Q) => filter.sections[b].q,
        ParamId::Biquad(b, ParamField::Fc) => filter.sections[b].fc,
        ParamId::TotalGainDb => filter.total_gain_db,
    }
}

fn set(filter: &mut FeedforwardFilter, id: ParamId, value: f64) {
    match id {
        ParamId::Biquad(b, ParamField::GainDb) => filter.sections[b].gain_db = value,
        ParamId::Biquad(b, ParamField::Q) => filter.sections[b].q = value,
        ParamId::Biquad(b, ParamField::Fc) => filter.sections[b].fc = value,
        ParamId::TotalGainDb => filter.total_gain_db = value,
    }
}

/// Fixed visitation order: biquad 0..B in (gain, Q, fc) order, then
/// `total_gain_dB` last (spec §4.7).
pub fn param_order(num_biquads: usize) -> Vec<ParamId> {
    let mut order = Vec::with_capacity(num_biquads * 3 + 1);
    for b in 0..num_biquads {
        order.push(ParamId::Biquad(b, ParamField::GainDb));
        order.push(ParamId::Biquad(b, ParamField::Q));
        order.push(ParamId::Biquad(b, ParamField::Fc));
    }
    order.push(ParamId::TotalGainDb);
    order
}

/// `L(theta) = (1/K) * sum_k |W_target,k - W_current(theta)_k|^2` (spec
/// §4.7).
pub fn loss(target: &[Complex64], filter: &FeedforwardFilter, sample_rate: f64, fft_len: usize) -> f64 {
    let current = filter.spectrum_response(sample_rate, fft_len, FFT_BINS);
    let sum: f64 = target
        .iter()
        .zip(current.iter())
        .map(|(t, c)| (t - c).norm_sqr())
        .sum();
    sum / FFT_BINS as f64
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizerReport {
    pub init_loss: f64,
    pub final_loss: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

impl OptimizerReport {
    /// Iteration acceptance: final loss strictly below the loss the
    /// parameters had on entry (spec §4.7).
    pub fn iteration_accepted(&self) -> bool {
        self.final_loss < self.init_loss
    }
}

/// Run one full pass of sequential coordinate descent over all 31
/// parameters, mutating `filter` in place (spec §4.7).
pub fn optimize(
    filter: &mut FeedforwardFilter,
    target: &[Complex64],
    sample_rate: f64,
    fft_len: usize,
) -> OptimizerReport {
    let init_loss = loss(target, filter, sample_rate, fft_len);
    let mut accepted_steps = 0;
    let mut rejected_steps = 0;

    for id in param_order(filter.sections.len()) {
        let spec = spec_for(id);
        let v = get(filter, id);
        let l_before = loss(target, filter, sample_rate, fft_len);

        set(filter, id, v + spec.epsilon);
        let l_plus = loss(target, filter, sample_rate, fft_len);
        set(filter, id, v);

        let g = (l_plus - l_before) / spec.epsilon;
        let delta = (-spec.eta * g).clamp(-spec.delta_max, spec.delta_max);
        let candidate = (v + delta).clamp(spec.bounds.0, spec.bounds.1);

        set(filter, id, candidate);
        let l_new = loss(target, filter, sample_rate, fft_len);

        if l_new < l_before {
            accepted_steps += 1;
        } else {
            set(filter, id, v);
            rejected_steps += 1;
        }
    }

    let final_loss = loss(target, filter, sample_rate, fft_len);
    OptimizerReport {
        init_loss,
        final_loss,
        accepted_steps,
        rejected_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_core::{FFT_LEN, R_DSP};

    #[test]
    fn matching_target_yields_zero_movement() {
        let mut filter = FeedforwardFilter::flat(1000.0);
        let target = filter.spectrum_response(R_DSP, FFT_LEN, FFT_BINS);
        let before = filter.clone();
        let report = optimize(&mut filter, &target, R_DSP, FFT_LEN);
        assert!(report.final_loss <= report.init_loss + 1e-12);
        for (a, b) in filter.sections.iter().zip(before.sections.iter()) {
            assert!((a.gain_db - b.gain_db).abs() < 1e-6);
            assert!((a.q - b.q).abs() < 1e-6);
            assert!((a.fc - b.fc).abs() < 1e-3);
        }
    }

    #[test]
    fn params_stay_in_bounds_after_optimization() {
        let mut filter = FeedforwardFilter::flat(1000.0);
        let mut target = filter.spectrum_response(R_DSP, FFT_LEN, FFT_BINS);
        for t in target.iter_mut() {
            *t *= 10.0;
        }
        optimize(&mut filter, &target, R_DSP, FFT_LEN);
        for section in &filter.sections {
            assert!(section.in_bounds());
        }
        assert!(filter.total_gain_db >= TOTAL_GAIN_DB_RANGE.0 && filter.total_gain_db <= TOTAL_GAIN_DB_RANGE.1);
    }

    #[test]
    fn loss_never_increases_across_full_pass() {
        let mut filter = FeedforwardFilter::flat(1000.0);
        let mut target = filter.spectrum_response(R_DSP, FFT_LEN, FFT_BINS);
        for (k, t) in target.iter_mut().enumerate() {
            *t += Complex64::new(0.01 * (k as f64 % 7.0), 0.0);
        }
        let report = optimize(&mut filter, &target, R_DSP, FFT_LEN);
        assert!(report.final_loss <= report.init_loss);
    }
}
