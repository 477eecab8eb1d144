//! Block-rate analyzer (C4, spec §4.4): decimates FF/FB/SPK from the
//! realtime rate, accumulates `N_AVG` overlapping windowed FFTs per
//! iteration, and exposes the averaged spectra once an iteration's worth
//! of passes have completed.

use anc_core::{FFT_BINS, FFT_LEN, N_AVG, OVERLAP, R_DSP, R_RT};
use anc_dsp::complex::{BlackmanWindow, RealSpectrum};
use num_complex::Complex64;

use crate::accumulator::{AveragedSpectra, SpectrumAccumulator};
use crate::ring::{decimate_nearest, RingBuffer};

/// Analysis-rate hop between successive windowed FFTs: `L*(1-overlap)`.
pub const HOP: usize = ((FFT_LEN as f64) * (1.0 - OVERLAP)) as usize;

pub struct BlockAnalyzer {
    ff_ring: RingBuffer,
    fb_ring: RingBuffer,
    spk_ring: RingBuffer,
    window: BlackmanWindow,
    ff_fft: RealSpectrum,
    fb_fft: RealSpectrum,
    spk_fft: RealSpectrum,
    scratch_time: Vec<f64>,
    scratch_windowed: Vec<f64>,
    accumulator: SpectrumAccumulator,
    /// Running count of decimated analysis samples accumulated since the
    /// last hop. Signed to tolerate the documented cadence quirk (spec §9):
    /// all `N_AVG` passes may fire within a single frame call once the
    /// ring first fills, subtracting `HOP` each time regardless of whether
    /// fresh samples arrived in between.
    sample_count: i64,
    fft_count: usize,
}

impl BlockAnalyzer {
    pub fn new() -> Self {
        Self {
            ff_ring: RingBuffer::new(FFT_LEN),
            fb_ring: RingBuffer::new(FFT_LEN),
            spk_ring: RingBuffer::new(FFT_LEN),
            window: BlackmanWindow::new(FFT_LEN),
            ff_fft: RealSpectrum::new(FFT_LEN),
            fb_fft: RealSpectrum::new(FFT_LEN),
            spk_fft: RealSpectrum::new(FFT_LEN),
            scratch_time: vec![0.0; FFT_LEN],
            scratch_windowed: vec![0.0; FFT_LEN],
            accumulator: SpectrumAccumulator::new(),
            sample_count: 0,
            fft_count: 0,
        }
    }

    pub fn fft_count(&self) -> usize {
        self.fft_count
    }

    /// Ingest one realtime-rate frame for each of FF, FB, SPK. Returns
    /// `true` once `N_AVG` FFT passes have completed for the current
    /// iteration (spec §4.4).
    pub fn ingest_frame(&mut self, ff_rt: &[f64], fb_rt: &[f64], spk_rt: &[f64]) -> bool {
        let ff_dec = decimate_nearest(ff_rt, R_RT, R_DSP);
        let fb_dec = decimate_nearest(fb_rt, R_RT, R_DSP);
        let spk_dec = decimate_nearest(spk_rt, R_RT, R_DSP);

        for &x in &ff_dec {
            self.ff_ring.push(x);
        }
        for &x in &fb_dec {
            self.fb_ring.push(x);
        }
        for &x in &spk_dec {
            self.spk_ring.push(x);
        }
        self.sample_count += ff_dec.len() as i64;

        if self.fft_count >= N_AVG {
            return true;
        }
        if self.fft_count == 0 && self.sample_count < FFT_LEN as i64 {
            return false;
        }

        // Once triggered, run every remaining pass now — this is the
        // documented cadence quirk (spec §9): no further sample_count
        // check gates individual passes within the run.
        while self.fft_count < N_AVG {
            self.run_pass();
            self.sample_count -= HOP as i64;
            self.fft_count += 1;
        }
        true
    }

    fn run_pass(&mut self) {
        let mut ff_bins = vec![Complex64::new(0.0, 0.0); FFT_BINS];
        let mut fb_bins = vec![Complex64::new(0.0, 0.0); FFT_BINS];
        let mut spk_bins = vec![Complex64::new(0.0, 0.0); FFT_BINS];

        self.ff_ring.copy_ordered_into(&mut self.scratch_time);
        self.window.apply(&self.scratch_time, &mut self.scratch_windowed);
        self.ff_fft.forward(&self.scratch_windowed, &mut ff_bins);

        self.fb_ring.copy_ordered_into(&mut self.scratch_time);
        self.window.apply(&self.scratch_time, &mut self.scratch_windowed);
        self.fb_fft.forward(&self.scratch_windowed, &mut fb_bins);

        self.spk_ring.copy_ordered_into(&mut self.scratch_time);
        self.window.apply(&self.scratch_time, &mut self.scratch_windowed);
        self.spk_fft.forward(&self.scratch_windowed, &mut spk_bins);

        self.accumulator.accumulate(&ff_bins, &fb_bins, &spk_bins);
    }

    /// Averaged FF/FB/SPK spectra and primary-path estimate for the
    /// completed iteration (spec §4.4).
    pub fn averaged(&self) -> AveragedSpectra {
        self.accumulator.average()
    }

    /// Reset `fft_count` (and the accumulator) for the next iteration.
    /// Called after both accepted and rejected iterations (spec §8:
    /// "after UPDATE_FILTER_COEFFS it is in SIGNAL_PROCESS with
    /// fft_count=0 and frame_count=0").
    pub fn finish_iteration(&mut self) {
        self.fft_count = 0;
        self.accumulator.reset();
    }
}

impl Default for BlockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn realtime_frame_samples() -> usize {
        (R_RT * anc_core::FRAME_PERIOD_MS / 1000.0).round() as usize
    }

    #[test]
    fn ingest_frame_eventually_completes_n_avg_passes() {
        let mut analyzer = BlockAnalyzer::new();
        let frame_len = realtime_frame_samples();
        let frame = vec![0.0; frame_len];
        let mut ready = false;
        for _ in 0..200 {
            ready = analyzer.ingest_frame(&frame, &frame, &frame);
            if ready {
                break;
            }
        }
        assert!(ready);
        assert_eq!(analyzer.fft_count(), N_AVG);
    }

    #[test]
    fn finish_iteration_resets_fft_count() {
        let mut analyzer = BlockAnalyzer::new();
        let frame_len = realtime_frame_samples();
        let frame = vec![0.1; frame_len];
        for _ in 0..200 {
            if analyzer.ingest_frame(&frame, &frame, &frame) {
                break;
            }
        }
        analyzer.finish_iteration();
        assert_eq!(analyzer.fft_count(), 0);
    }

    #[test]
    fn silent_input_yields_zero_averaged_spectra() {
        let mut analyzer = BlockAnalyzer::new();
        let frame_len = realtime_frame_samples();
        let frame = vec![0.0; frame_len];
        for _ in 0..200 {
            if analyzer.ingest_frame(&frame, &frame, &frame) {
                break;
            }
        }
        let avg = analyzer.averaged();
        assert!(avg.ff_avg.iter().all(|c| c.norm() < 1e-9));
        assert!(avg.pp.iter().all(|c| c.norm() < 1e-9));
    }
}
