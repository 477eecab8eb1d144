//! anc-engine: the block-rate analyzer, target synthesizer, stability
//! gate, EQ optimizer, realtime bridge and session scheduler that together
//! form the feedforward ANC adaptation core.

pub mod accumulator;
pub mod analyzer;
pub mod bridge;
pub mod optimizer;
pub mod report;
pub mod ring;
pub mod session;
pub mod stability;
pub mod target;

pub use analyzer::BlockAnalyzer;
pub use bridge::RealtimeBridge;
pub use optimizer::{optimize, OptimizerReport, ParamId};
pub use report::IterationReport;
pub use session::Session;
pub use stability::{RejectReason, StabilityGate, Verdict};
pub use target::synthesize_target;
