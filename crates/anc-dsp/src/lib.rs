//! anc-dsp: DSP building blocks for the feedforward ANC adaptation core.
//!
//! ## Modules
//! - `complex` — windowing and real-FFT helpers used by the block-rate
//!   analyzer (spec §4.1).
//! - `biquad` — RBJ biquad coefficient synthesis, cascade frequency
//!   response, and the realtime DF-II-T sample stepper (spec §4.2).
//! - `convolution` — direct-form FIR convolver used to model the secondary
//!   (speaker-to-error-mic) and primary acoustic paths (spec §4.3).
//! - `presets` — the built-in secondary-path preset table (spec §6).

pub mod biquad;
pub mod complex;
pub mod convolution;
pub mod presets;

use anc_core::Sample;

/// Trait for all DSP processors in the adaptation core.
pub trait Processor {
    /// Reset processor state (delay lines, filter memory).
    fn reset(&mut self);

    /// Latency introduced by this processor, in samples.
    fn latency(&self) -> usize {
        0
    }
}

/// Mono sample-at-a-time processor.
pub trait MonoProcessor: Processor {
    fn process_sample(&mut self, input: Sample) -> Sample;

    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Processor configuration for sample-rate changes.
pub trait ProcessorConfig {
    fn set_sample_rate(&mut self, sample_rate: f64);
}
