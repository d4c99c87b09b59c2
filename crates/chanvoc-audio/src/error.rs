//! Error types for the DSP backend.

use std::path::PathBuf;

use chanvoc_spec::{SpecError, ValidationError};
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while building filters or rendering audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The vocoder config failed validation.
    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Invalid frequency.
    #[error("invalid frequency: {freq} Hz")]
    InvalidFrequency {
        /// The invalid frequency.
        freq: f64,
    },

    /// Requested duration cannot hold the required segments.
    #[error("invalid duration: {samples} samples, need at least {required}")]
    InvalidDuration {
        /// Requested duration in samples.
        samples: usize,
        /// Minimum duration in samples.
        required: usize,
    },

    /// Channel index outside the filter bank.
    #[error("channel index {index} out of range for {count} channels")]
    ChannelIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of channels in the bank.
        count: usize,
    },

    /// A carrier sample file does not exist.
    #[error("resource not found: {}", path.display())]
    ResourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// WAV decoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Sample rate conversion failed.
    #[error("resample error: {message}")]
    Resample {
        /// Error message.
        message: String,
    },

    /// A designed filter has a pole on or outside the unit circle.
    #[error("unstable filter: pole radius {radius}")]
    UnstableFilter {
        /// Largest pole radius.
        radius: f64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config parsing error.
    #[error("config error: {0}")]
    Spec(#[from] SpecError),
}

impl AudioError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a resample error.
    pub fn resample(message: impl Into<String>) -> Self {
        Self::Resample {
            message: message.into(),
        }
    }

    /// Returns true for bad parameter ranges, as opposed to resource or I/O failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AudioError::Validation(_)
                | AudioError::InvalidParameter { .. }
                | AudioError::InvalidFrequency { .. }
                | AudioError::InvalidDuration { .. }
                | AudioError::ChannelIndexOutOfRange { .. }
        )
    }

    /// Stable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            AudioError::Validation(_) => "AUDIO_001",
            AudioError::InvalidParameter { .. } => "AUDIO_002",
            AudioError::InvalidFrequency { .. } => "AUDIO_003",
            AudioError::InvalidDuration { .. } => "AUDIO_004",
            AudioError::ChannelIndexOutOfRange { .. } => "AUDIO_005",
            AudioError::ResourceNotFound { .. } => "AUDIO_006",
            AudioError::Wav(_) => "AUDIO_007",
            AudioError::Resample { .. } => "AUDIO_008",
            AudioError::UnstableFilter { .. } => "AUDIO_009",
            AudioError::Io(_) => "AUDIO_010",
            AudioError::Spec(_) => "AUDIO_011",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanvoc_spec::ErrorCode;

    #[test]
    fn test_invalid_param_helper() {
        let err = AudioError::invalid_param("compressor.ratio", "must be >= 1");
        assert!(err.to_string().contains("compressor.ratio"));
        assert!(err.to_string().contains(">= 1"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_validation_error_converts() {
        let err: AudioError =
            ValidationError::new(ErrorCode::InvalidNoiseAmplitude, "too loud").into();
        assert!(err.is_validation());
        assert_eq!(err.code(), "AUDIO_001");
        assert!(err.to_string().contains("E030"));
    }

    #[test]
    fn test_resource_not_found_is_not_validation() {
        let err = AudioError::ResourceNotFound {
            path: PathBuf::from("carriers/missing.wav"),
        };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("carriers/missing.wav"));
    }
}
