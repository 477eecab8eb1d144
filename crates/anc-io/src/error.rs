//! Error types for file-format-specific failures (spec §7 categories
//! i-ii). These degrade to documented fallbacks in `wav` and `ir` rather
//! than propagating — only allocation failure (category iii, surfaced as
//! `anc_core::AncError::Allocation`) is fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("input file not found: {0}")]
    NotFound(String),

    #[error("unsupported WAV bit depth: {0} bits")]
    UnsupportedBitDepth(u16),

    #[error("unsupported WAV sample format (non-PCM)")]
    UnsupportedFormat,

    #[error("WAV file has no FB channel (need at least 2 channels, found {0})")]
    MissingChannel(usize),

    #[error("malformed preset table: {0}")]
    MalformedPresetTable(String),

    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IoResult<T> = Result<T, IoError>;
