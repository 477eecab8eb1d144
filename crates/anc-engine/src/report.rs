//! Per-iteration diagnostics snapshot, supplementing the spec's engine
//! modules with the kind of structured report the teacher's DSP pipeline
//! emits after each processing stage.

use crate::optimizer::OptimizerReport;
use crate::stability::Verdict;

/// Outcome of a single 325 ms adaptation iteration: whether the stability
/// gate accepted the new target, and if so how the optimizer moved.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration_index: usize,
    pub stability_verdict: Verdict,
    pub optimizer: Option<OptimizerReport>,
    pub filter_installed: bool,
}

impl IterationReport {
    pub fn rejected(iteration_index: usize, verdict: Verdict) -> Self {
        Self {
            iteration_index,
            stability_verdict: verdict,
            optimizer: None,
            filter_installed: false,
        }
    }

    pub fn accepted(iteration_index: usize, verdict: Verdict, optimizer: OptimizerReport, filter_installed: bool) -> Self {
        Self {
            iteration_index,
            stability_verdict: verdict,
            optimizer: Some(optimizer),
            filter_installed,
        }
    }

    /// One-line human-readable summary, in the style of the teacher's
    /// per-stage log lines.
    pub fn summary_line(&self) -> String {
        match (&self.stability_verdict, &self.optimizer) {
            (Verdict::Accept { smoothness }, Some(opt)) => format!(
                "iteration {}: accepted (smoothness={:.4}, loss {:.6} -> {:.6}, {} params moved, installed={})",
                self.iteration_index, smoothness, opt.init_loss, opt.final_loss, opt.accepted_steps, self.filter_installed
            ),
            (Verdict::Reject(reason), _) => format!(
                "iteration {}: rejected ({:?})",
                self.iteration_index, reason
            ),
            _ => format!("iteration {}: no-op", self.iteration_index),
        }
    }
}
