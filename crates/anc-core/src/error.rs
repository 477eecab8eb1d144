//! Error types for the ANC adaptation core.

use thiserror::Error;

/// Core error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum AncError {
    #[error("DSP error: {0}")]
    Dsp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Buffer allocation failed: {0}")]
    Allocation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State error: {0}")]
    State(String),
}

/// Result type alias used throughout the workspace.
pub type AncResult<T> = Result<T, AncError>;
