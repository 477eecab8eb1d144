//! Session scheduler (C9, spec §4.9): drives the SIGNAL_PROCESS ->
//! CAL_MU -> CAL_FF_RESPONSE -> CAL_TARGET_FF -> STABLE_CHECK ->
//! (CAL_FF_INIT_LOSS -> UPDATE_EQ_PARAMS -> UPDATE_FILTER_COEFFS) loop over
//! one full-length FF/FB recording, one 325 ms chunk at a time.

use anc_core::{AncError, FFT_LEN, FRAME_PERIOD_MS, R_RT};
use anc_dsp::biquad::FeedforwardFilter;
use anc_dsp::presets::SecondaryPathPreset;
use num_complex::Complex64;

use crate::analyzer::BlockAnalyzer;
use crate::bridge::RealtimeBridge;
use crate::optimizer::optimize;
use crate::report::IterationReport;
use crate::stability::{StabilityGate, Verdict};
use crate::target::synthesize_target;

/// Length of one adaptation iteration window, in milliseconds (spec §4.9).
pub const ITERATION_WINDOW_MS: f64 = 325.0;

fn realtime_frame_len() -> usize {
    (R_RT * FRAME_PERIOD_MS / 1000.0).round() as usize
}

fn iteration_chunk_len() -> usize {
    (R_RT * ITERATION_WINDOW_MS / 1000.0).round() as usize
}

/// Owns the full FF/FB streams for one run (RAII-freed on drop, matching
/// the "scoped acquisition with guaranteed release" resource model — spec
/// §5), the read cursor, and every stateful stage of the adaptation
/// pipeline.
pub struct Session {
    ff: Vec<f64>,
    fb: Vec<f64>,
    read_cursor: usize,
    analyzer: BlockAnalyzer,
    filter: FeedforwardFilter,
    gate: StabilityGate,
    bridge: RealtimeBridge,
    secondary_spectrum: Vec<Complex64>,
    sample_rate_dsp: f64,
}

impl Session {
    pub fn new(ff: Vec<f64>, fb: Vec<f64>, preset: &SecondaryPathPreset, secondary_ir: &[f64]) -> Result<Self, AncError> {
        if ff.len() != fb.len() {
            return Err(AncError::InvalidParam("ff and fb streams must have equal length".into()));
        }
        let filter = FeedforwardFilter {
            sections: preset.initial_sections,
            total_gain_db: preset.total_gain_db,
        };
        let mut bridge = RealtimeBridge::new(secondary_ir);
        bridge.install(&filter);
        Ok(Self {
            ff,
            fb,
            read_cursor: 0,
            analyzer: BlockAnalyzer::new(),
            filter,
            gate: StabilityGate::new(),
            bridge,
            secondary_spectrum: preset.spectrum.clone(),
            sample_rate_dsp: anc_core::R_DSP,
        })
    }

    pub fn filter(&self) -> &FeedforwardFilter {
        &self.filter
    }

    pub fn ff(&self) -> &[f64] {
        &self.ff
    }

    pub fn fb(&self) -> &[f64] {
        &self.fb
    }

    /// Process every full 325 ms chunk remaining in the streams, returning
    /// one [`IterationReport`] per completed iteration. A trailing partial
    /// chunk is discarded untouched (spec §5 partial-iteration semantics).
    pub fn run(&mut self) -> Vec<IterationReport> {
        let chunk_len = iteration_chunk_len();
        let frame_len = realtime_frame_len();
        let mut reports = Vec::new();
        let mut iteration_index = 0;

        while self.read_cursor + chunk_len <= self.ff.len() {
            let chunk_end = self.read_cursor + chunk_len;
            let mut pos = self.read_cursor;

            while pos + frame_len <= chunk_end {
                let ff_frame = &self.ff[pos..pos + frame_len];
                let fb_frame = &self.fb[pos..pos + frame_len];
                let spk_frame: Vec<f64> = ff_frame.iter().map(|&x| self.bridge.process_spk(x)).collect();

                if self.analyzer.ingest_frame(ff_frame, fb_frame, &spk_frame) {
                    reports.push(self.complete_iteration(iteration_index));
                    iteration_index += 1;
                }
                pos += frame_len;
            }

            self.read_cursor = chunk_end;
        }

        reports
    }

    fn complete_iteration(&mut self, iteration_index: usize) -> IterationReport {
        let averaged = self.analyzer.averaged();

        let target = synthesize_target(
            &averaged.ff_avg,
            &averaged.pp,
            &self.secondary_spectrum,
            &self.filter,
            self.sample_rate_dsp,
            FFT_LEN,
        );

        let (verdict, h_db) = self.gate.evaluate(&target);

        let report = match verdict {
            Verdict::Reject(reason) => {
                log::debug!("iteration {iteration_index}: stability gate rejected ({reason:?})");
                self.analyzer.finish_iteration();
                IterationReport::rejected(iteration_index, Verdict::Reject(reason))
            }
            Verdict::Accept { smoothness } => {
                self.gate.commit(smoothness, h_db);

                let mut candidate = self.filter.clone();
                let opt_report = optimize(&mut candidate, &target, self.sample_rate_dsp, FFT_LEN);

                let installed = opt_report.iteration_accepted();
                if installed {
                    self.filter = candidate;
                    self.bridge.install(&self.filter);
                    self.rewrite_fb_from_cursor();
                    log::info!(
                        "iteration {iteration_index}: filter updated, loss {:.6} -> {:.6}",
                        opt_report.init_loss, opt_report.final_loss
                    );
                } else {
                    log::debug!("iteration {iteration_index}: optimizer pass did not reduce loss, filter unchanged");
                }

                self.analyzer.finish_iteration();
                IterationReport::accepted(iteration_index, Verdict::Accept { smoothness }, opt_report, installed)
            }
        };

        report
    }

    /// Rewrite `fb[read_cursor..]` in place using the freshly installed
    /// filter, leaving `ff` untouched (spec §8 scenario 6).
    fn rewrite_fb_from_cursor(&mut self) {
        for i in self.read_cursor..self.ff.len() {
            let spk = self.bridge.process_spk(self.ff[i]);
            self.fb[i] -= spk;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_dsp::presets::preset_table;

    fn silent_session(seconds: f64) -> Session {
        let n = (R_RT * seconds).round() as usize;
        let preset = &preset_table()[0];
        Session::new(vec![0.0; n], vec![0.0; n], preset, &[1.0]).unwrap()
    }

    #[test]
    fn silent_input_produces_no_filter_changes() {
        let mut session = silent_session(1.0);
        let reports = session.run();
        assert!(!reports.is_empty());
        for report in &reports {
            assert!(!report.filter_installed);
        }
    }

    #[test]
    fn partial_trailing_chunk_is_not_processed() {
        let chunk_len = iteration_chunk_len();
        let n = chunk_len + chunk_len / 2;
        let preset = &preset_table()[0];
        let mut session = Session::new(vec![0.0; n], vec![0.0; n], preset, &[1.0]).unwrap();
        session.run();
        assert_eq!(session.read_cursor, chunk_len);
    }

    #[test]
    fn mismatched_stream_lengths_are_rejected() {
        let preset = &preset_table()[0];
        let result = Session::new(vec![0.0; 10], vec![0.0; 20], preset, &[1.0]);
        assert!(result.is_err());
    }
}
