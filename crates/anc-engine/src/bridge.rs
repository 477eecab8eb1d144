//! Realtime bridge (C8, spec §4.8): the installed cascade plus
//! secondary-path FIR convolver, stepped at `R_RT` to both synthesize the
//! SPK reference during accumulation and rewrite FB on acceptance.

use anc_core::R_RT;
use anc_dsp::biquad::{CascadeProcessor, FeedforwardFilter};
use anc_dsp::convolution::FirConvolver;
use anc_dsp::{MonoProcessor, Processor, ProcessorConfig};

/// Bundles the realtime cascade and secondary-path convolver that together
/// model what the loudspeaker actually radiates back into the error mic.
pub struct RealtimeBridge {
    cascade: CascadeProcessor,
    secondary: FirConvolver,
}

impl RealtimeBridge {
    pub fn new(secondary_ir: &[f64]) -> Self {
        Self {
            cascade: CascadeProcessor::new(R_RT),
            secondary: FirConvolver::new(secondary_ir),
        }
    }

    /// Install a freshly accepted filter. Only the cascade's biquad states
    /// reset (spec §4.8 names only "B sample-stepper states"); the FIR
    /// delay line is left untouched.
    pub fn install(&mut self, filter: &FeedforwardFilter) {
        self.cascade.set_filter(filter);
        self.cascade.reset();
    }

    /// Push one realtime sample through cascade then secondary path,
    /// producing the SPK reference sample fed to the block analyzer.
    pub fn process_spk(&mut self, ff_sample: f64) -> f64 {
        let filtered = self.cascade.process_sample(ff_sample);
        self.secondary.process_sample(filtered)
    }

    /// Rewrite one FB sample in place for the realtime-reset scenario
    /// (spec §8 scenario 5): `fb' = fb - spk`.
    pub fn cancel_sample(&mut self, ff_sample: f64, fb_sample: f64) -> f64 {
        fb_sample - self.process_spk(ff_sample)
    }

    pub fn set_secondary_ir(&mut self, ir: &[f64]) {
        self.secondary.set_impulse_response(ir);
    }
}
