//! Engine Error Types

use thiserror::Error;

/// Errors that can occur decoding persisted state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Malformed state blob: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unrecognized state format: {0:?}")]
    UnknownFormat(String),

    #[error("Unsupported state version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Parameter {key} has the wrong value type")]
    InvalidValue { key: String },

    #[error("Failed to encode state: {0}")]
    Encode(String),
}

/// Errors that can occur in the host-facing processor
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported bus layout: {inputs} in / {outputs} out (only stereo in/out is supported)")]
    UnsupportedLayout { inputs: usize, outputs: usize },

    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    #[error("State error: {0}")]
    StateError(#[from] StateError),

    #[error("DSP error: {0}")]
    DspError(#[from] sixband_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnsupportedLayout {
            inputs: 1,
            outputs: 2,
        };
        assert!(err.to_string().contains("1 in / 2 out"));

        let err = StateError::UnsupportedVersion {
            found: 9,
            supported: 1,
        };
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_error_from_dsp() {
        let dsp_err = sixband_dsp::DspError::NotPrepared;
        let engine_err: EngineError = dsp_err.into();
        assert!(matches!(engine_err, EngineError::DspError(_)));
    }

    #[test]
    fn test_error_from_state() {
        let parse_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let engine_err: EngineError = StateError::from(parse_err).into();
        assert!(matches!(
            engine_err,
            EngineError::StateError(StateError::Malformed(_))
        ));
    }
}
