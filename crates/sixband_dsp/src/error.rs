//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Engine not ready - prepare() must be called before process()")]
    NotPrepared,

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    #[error("Invalid block size: {0} (must be positive)")]
    InvalidBlockSize(usize),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Result type alias for DSP operations
pub type DspResult<T> = Result<T, DspError>;
