//! Config validation logic.

use crate::carrier::{FrequencySpec, OscillatorShape};
use crate::config::{NoiseInjection, SynthesisMode, VocoderConfig};
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::filter::FilterFamily;

/// Highest supported order for designed IIR filters.
pub const MAX_FILTER_ORDER: f64 = 16.0;

/// Validates a vocoder config and returns a validation result.
///
/// # Arguments
/// * `config` - The config to validate
///
/// # Returns
/// * `ValidationResult` with `ok=true` if validation passed, with any warnings.
/// * `ValidationResult` with `ok=false` and errors if validation failed.
///
/// # Example
/// ```
/// use chanvoc_spec::{CarrierSpec, VocoderConfig};
/// use chanvoc_spec::validation::validate_config;
///
/// let config = VocoderConfig::new(8, 44100, CarrierSpec::sawtooth(440.0));
/// assert!(validate_config(&config).is_ok());
/// ```
pub fn validate_config(config: &VocoderConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_engine_shape(config, &mut result);
    validate_filter_order(config, &mut result);
    validate_carrier(config, &mut result);

    if let SynthesisMode::Spectral(params) = config.mode {
        validate_spectral(params.frame_size, params.hop_size, params.balance, &mut result);
    }

    if let Some(ref noise) = config.noise {
        validate_noise(noise, &mut result);
    }

    check_warnings(config, &mut result);

    result
}

/// Validates channel count and sample rate.
fn validate_engine_shape(config: &VocoderConfig, result: &mut ValidationResult) {
    if config.channel_count == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidChannelCount,
            "channel_count must be at least 1",
            "channel_count",
        ));
    }

    if config.sample_rate == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSampleRate,
            "sample_rate must be positive",
            "sample_rate",
        ));
    }
}

/// Validates the filter order against the filter family.
fn validate_filter_order(config: &VocoderConfig, result: &mut ValidationResult) {
    let order = config.filter_order;

    if config.filter_family == FilterFamily::Biquad {
        if !(order.is_finite() && order > 0.0) {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidFilterOrder,
                format!("biquad Q must be positive, got {}", order),
                "filter_order",
            ));
        }
        return;
    }

    if !(order.is_finite() && order.fract() == 0.0 && (1.0..=MAX_FILTER_ORDER).contains(&order)) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFilterOrder,
            format!(
                "filter_order must be an integer in [1, {}], got {}",
                MAX_FILTER_ORDER, order
            ),
            "filter_order",
        ));
    }
}

/// Validates the carrier shape and its frequency spec.
fn validate_carrier(config: &VocoderConfig, result: &mut ValidationResult) {
    let carrier = &config.carrier;

    match carrier.shape {
        OscillatorShape::Sampled { ref path } => {
            if path.as_os_str().is_empty() {
                result.add_error(ValidationError::with_path(
                    ErrorCode::MissingCarrierPath,
                    "sampled carrier requires a non-empty path",
                    "carrier.shape.sampled.path",
                ));
            }
            // Frequency is unused for sampled carriers
            return;
        }
        OscillatorShape::SweptSawtooth => {
            if !carrier.frequency.is_sweep() {
                result.add_error(ValidationError::with_path(
                    ErrorCode::ShapeFrequencyMismatch,
                    "swept_sawtooth requires a sweep frequency",
                    "carrier.frequency",
                ));
            }
        }
        OscillatorShape::Sawtooth | OscillatorShape::Square => {}
    }

    validate_frequency(&carrier.frequency, result);
}

fn validate_frequency(frequency: &FrequencySpec, result: &mut ValidationResult) {
    for (field, value) in frequency.endpoints() {
        if !(value.is_finite() && value > 0.0) {
            result.add_error(ValidationError::with_path(
                ErrorCode::NonPositiveFrequency,
                format!("carrier frequency must be positive and finite, got {}", value),
                format!("carrier.frequency.{}", field),
            ));
        }
    }
}

/// Validates short-time analysis parameters.
fn validate_spectral(
    frame_size: usize,
    hop_size: usize,
    balance: f64,
    result: &mut ValidationResult,
) {
    if frame_size < 2 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFrameParams,
            format!("frame_size must be at least 2, got {}", frame_size),
            "mode.spectral.frame_size",
        ));
    }

    if hop_size == 0 || hop_size > frame_size / 2 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFrameParams,
            format!(
                "hop_size must be in [1, frame_size / 2], got {} for frame_size {}",
                hop_size, frame_size
            ),
            "mode.spectral.hop_size",
        ));
    }

    if !(0.0..=1.0).contains(&balance) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidBalance,
            format!("balance must be in [0, 1], got {}", balance),
            "mode.spectral.balance",
        ));
    }
}

/// Validates noise injection parameters.
fn validate_noise(noise: &NoiseInjection, result: &mut ValidationResult) {
    if !(noise.amplitude > 0.0 && noise.amplitude <= 1.0) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidNoiseAmplitude,
            format!("noise amplitude must be in (0, 1], got {}", noise.amplitude),
            "noise.amplitude",
        ));
    }

    if !(noise.q.is_finite() && noise.q > 0.0) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidNoiseQ,
            format!("noise q must be positive, got {}", noise.q),
            "noise.q",
        ));
    }
}

/// Adds non-fatal warnings.
fn check_warnings(config: &VocoderConfig, result: &mut ValidationResult) {
    let nyquist = config.nyquist();
    if config.sample_rate > 0 && !matches!(config.carrier.shape, OscillatorShape::Sampled { .. }) {
        let peak = config.carrier.frequency.peak();
        if peak >= nyquist {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::CarrierAboveNyquist,
                format!(
                    "carrier frequency {} Hz is at or above Nyquist ({} Hz) and will alias",
                    peak, nyquist
                ),
                "carrier.frequency",
            ));
        }
    }

    if config.channel_count > 0 && config.formant_step.unsigned_abs() as usize >= config.channel_count
    {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::FormantStepWraps,
            format!(
                "formant_step {} wraps around {} channels",
                config.formant_step, config.channel_count
            ),
            "formant_step",
        ));
    }
}
