//! Run configuration (spec SPEC_FULL §3 ambient Config), in the style of
//! the teacher's `OfflineConfig`: a serde-serializable bundle of
//! everything the CLI needs to wire `anc-io` into an `anc-engine::Session`.

use serde::{Deserialize, Serialize};

/// Top-level run configuration: preset selection, file paths, and an
/// optional iteration cap for batch/CI runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Index into `anc_dsp::presets::preset_table` (0..N_PRESETS).
    pub preset_index: usize,
    /// Input WAV path; channel 0 = FF, channel 1 = FB. `None` synthesizes
    /// the fallback test tones (spec §6).
    pub input_wav: Option<String>,
    /// Output WAV path for the original FF and residual FB.
    pub output_wav: String,
    /// Secondary-path impulse response binary path. `None` falls back to
    /// `h[n] = 0.5 * exp(-n/100)`.
    pub impulse_response: Option<String>,
    /// Iteration log path. Always mirrored to stdout via `log`.
    pub log_path: Option<String>,
    /// Cap on the number of adaptation iterations processed, for
    /// bounded batch/CI runs. `None` processes every full 325 ms chunk in
    /// the stream.
    pub max_iterations: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            preset_index: 0,
            input_wav: None,
            output_wav: "output.wav".to_string(),
            impulse_response: None,
            log_path: None,
            max_iterations: None,
        }
    }
}
