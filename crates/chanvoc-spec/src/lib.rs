//! chanvoc Config Library
//!
//! This crate provides the types and validation for chanvoc vocoding jobs.
//! A job is described by a [`VocoderConfig`]: the filter bank layout, the
//! carrier oscillator, the envelope transfer mode and optional noise
//! injection. Configs are plain serde types and can be read from JSON.
//!
//! # Example
//!
//! ```
//! use chanvoc_spec::{CarrierSpec, SpacingMode, SweepLaw, VocoderConfig};
//! use chanvoc_spec::validation::validate_config;
//!
//! let config = VocoderConfig::new(16, 44100, CarrierSpec::swept_sawtooth(110.0, 440.0, SweepLaw::Exponential))
//!     .with_spacing(SpacingMode::Mel)
//!     .with_formant_step(2);
//!
//! let result = validate_config(&config);
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error and warning types for validation
//! - [`carrier`]: Carrier oscillator shapes and frequency specs
//! - [`filter`]: Filter family, spacing mode and passband types
//! - [`config`]: The top-level vocoder config
//! - [`validation`]: Config validation functions

pub mod carrier;
pub mod config;
pub mod error;
pub mod filter;
pub mod validation;

// Re-export commonly used types at the crate root
pub use carrier::{CarrierSpec, FrequencySpec, OscillatorShape, SweepLaw, POWER_SWEEP_EXPONENT};
pub use config::{
    NoiseInjection, SpectralParams, SynthesisMode, VocoderConfig, DEFAULT_FILTER_ORDER,
    DEFAULT_FRAME_SIZE, DEFAULT_HOP_SIZE, DEFAULT_NOISE_Q, NOISE_CUTOFF_HZ,
};
pub use error::{
    ErrorCode, SpecError, ValidationError, ValidationResult, ValidationWarning, WarningCode,
};
pub use filter::{FilterFamily, FilterSpec, SpacingMode};
pub use validation::{validate_config, MAX_FILTER_ORDER};
