//! Error types for config validation and processing.

use thiserror::Error;

/// Error codes for config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Engine shape errors (E001-E009)
    /// E001: Channel count must be at least 1
    InvalidChannelCount,
    /// E002: Sample rate must be positive
    InvalidSampleRate,
    /// E003: Filter order (or biquad Q) out of range
    InvalidFilterOrder,
    /// E004: Band cutoffs outside (0, Nyquist] or not increasing
    InvalidCutoff,

    // Carrier errors (E010-E014)
    /// E010: Carrier frequency is zero, negative or not finite
    NonPositiveFrequency,
    /// E011: Oscillator shape and frequency spec do not fit together
    ShapeFrequencyMismatch,
    /// E012: Sampled carrier without a path
    MissingCarrierPath,

    // Spectral mode errors (E020-E022)
    /// E020: Frame size or hop size out of range
    InvalidFrameParams,
    /// E021: Modulator/carrier balance outside [0, 1]
    InvalidBalance,

    // Noise injection errors (E030-E031)
    /// E030: Noise amplitude outside (0, 1]
    InvalidNoiseAmplitude,
    /// E031: Noise filter Q must be positive
    InvalidNoiseQ,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidChannelCount => "E001",
            ErrorCode::InvalidSampleRate => "E002",
            ErrorCode::InvalidFilterOrder => "E003",
            ErrorCode::InvalidCutoff => "E004",
            ErrorCode::NonPositiveFrequency => "E010",
            ErrorCode::ShapeFrequencyMismatch => "E011",
            ErrorCode::MissingCarrierPath => "E012",
            ErrorCode::InvalidFrameParams => "E020",
            ErrorCode::InvalidBalance => "E021",
            ErrorCode::InvalidNoiseAmplitude => "E030",
            ErrorCode::InvalidNoiseQ => "E031",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Carrier frequency at or above Nyquist, the carrier will alias
    CarrierAboveNyquist,
    /// W002: Formant step magnitude is not smaller than the channel count
    FormantStepWraps,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::CarrierAboveNyquist => "W001",
            WarningCode::FormantStepWraps => "W002",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// JSON path to the problematic field (e.g., "noise.amplitude").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// JSON path to the problematic field.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning with a JSON path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Top-level error type for config operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Config validation failed with one or more errors.
    #[error("config validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// A variant name (filter family, spacing mode, sweep law) was not recognized.
    #[error("unknown {kind} '{name}'")]
    UnknownVariant {
        /// What kind of name was being parsed.
        kind: &'static str,
        /// The unrecognized name.
        name: String,
    },

    /// A named carrier was given fewer frequencies than it needs.
    #[error("carrier '{name}' needs {required} frequencies, got {given}")]
    MissingFrequency {
        /// Carrier name.
        name: String,
        /// Frequencies the carrier needs.
        required: usize,
        /// Frequencies that were given.
        given: usize,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpecError {
    pub(crate) fn unknown(kind: &'static str, name: &str) -> Self {
        Self::UnknownVariant {
            kind,
            name: name.to_string(),
        }
    }
}

/// Result of config validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Adds an error and marks the result as failed.
    pub fn add_error(&mut self, error: ValidationError) {
        self.ok = false;
        self.errors.push(error);
    }

    /// Adds a warning.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if validation passed.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Converts into a `Result`, yielding the first error on failure.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ValidationError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(self.warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::InvalidChannelCount.code(), "E001");
        assert_eq!(ErrorCode::InvalidNoiseAmplitude.to_string(), "E030");
        assert_eq!(WarningCode::FormantStepWraps.to_string(), "W002");
    }

    #[test]
    fn test_validation_error_display_with_path() {
        let err = ValidationError::with_path(
            ErrorCode::InvalidNoiseAmplitude,
            "must be in (0, 1], got 1.5",
            "noise.amplitude",
        );
        assert_eq!(
            err.to_string(),
            "E030: must be in (0, 1], got 1.5 (at noise.amplitude)"
        );
    }

    #[test]
    fn test_validation_result_first_error_wins() {
        let mut result = ValidationResult::default();
        assert!(result.is_ok());

        result.add_error(ValidationError::new(ErrorCode::InvalidSampleRate, "zero"));
        result.add_error(ValidationError::new(ErrorCode::InvalidChannelCount, "zero"));
        assert!(!result.is_ok());

        let err = result.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSampleRate);
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = SpecError::unknown("filter family", "elliptic");
        assert_eq!(err.to_string(), "unknown filter family 'elliptic'");
    }
}
