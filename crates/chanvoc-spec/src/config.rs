//! Vocoder job configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::carrier::CarrierSpec;
use crate::error::{SpecError, ValidationResult};
use crate::filter::{FilterFamily, SpacingMode};
use crate::validation::validate_config;

/// Default filter order for IIR families.
pub const DEFAULT_FILTER_ORDER: f64 = 5.0;

/// Default short-time analysis frame size in samples.
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Default short-time analysis hop size in samples.
pub const DEFAULT_HOP_SIZE: usize = 256;

/// Default quality factor of the noise filter.
pub const DEFAULT_NOISE_Q: f64 = 0.707;

/// Center of the injected noise band: midpoint between 8 kHz and 16 kHz.
pub const NOISE_CUTOFF_HZ: f64 = (8000.0 + 16000.0) / 2.0;

fn default_filter_order() -> f64 {
    DEFAULT_FILTER_ORDER
}

fn default_true() -> bool {
    true
}

fn default_frame_size() -> usize {
    DEFAULT_FRAME_SIZE
}

fn default_hop_size() -> usize {
    DEFAULT_HOP_SIZE
}

fn default_balance() -> f64 {
    1.0
}

fn default_noise_q() -> f64 {
    DEFAULT_NOISE_Q
}

/// Short-time spectral synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralParams {
    /// Analysis frame size in samples.
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Hop between frames in samples.
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    /// Exponent applied to the modulator envelope, in [0, 1].
    /// 1.0 follows the modulator fully, 0.0 passes the carrier unchanged.
    #[serde(default = "default_balance")]
    pub balance: f64,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            balance: 1.0,
        }
    }
}

/// How per-channel envelopes are imposed on the carrier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    /// Sample-by-sample multiply of the two band signals.
    #[default]
    TimeDomain,
    /// Frame RMS of the modulator band scales the carrier band spectrum.
    Spectral(SpectralParams),
}

/// High-frequency noise added to the carrier before band splitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseInjection {
    /// Noise amplitude in (0, 1].
    pub amplitude: f64,
    /// Quality factor of the noise filter.
    #[serde(default = "default_noise_q")]
    pub q: f64,
    /// Seed for the noise generator.
    #[serde(default)]
    pub seed: u32,
}

impl NoiseInjection {
    /// Creates noise injection with the default Q and seed 0.
    pub fn new(amplitude: f64) -> Self {
        Self {
            amplitude,
            q: DEFAULT_NOISE_Q,
            seed: 0,
        }
    }

    /// Sets the generator seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the filter quality factor.
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }
}

/// Complete description of a vocoding job.
///
/// A config is fixed for the lifetime of the engine built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocoderConfig {
    /// Number of filter bank channels.
    pub channel_count: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Band edge spacing.
    #[serde(default)]
    pub spacing: SpacingMode,
    /// Band-pass design family.
    #[serde(default)]
    pub filter_family: FilterFamily,
    /// Filter order (Q for the biquad family).
    #[serde(default = "default_filter_order")]
    pub filter_order: f64,
    /// Carrier oscillator.
    pub carrier: CarrierSpec,
    /// Envelope transfer mode.
    #[serde(default)]
    pub mode: SynthesisMode,
    /// Channel offset between modulator and carrier bands.
    #[serde(default)]
    pub formant_step: i32,
    /// Optional noise injected into the carrier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseInjection>,
    /// Scale the output down to a peak of 1.0 when it exceeds it.
    #[serde(default = "default_true")]
    pub normalize: bool,
}

impl VocoderConfig {
    /// Creates a config with default filter, mode and conditioning settings.
    pub fn new(channel_count: usize, sample_rate: u32, carrier: CarrierSpec) -> Self {
        Self {
            channel_count,
            sample_rate,
            spacing: SpacingMode::default(),
            filter_family: FilterFamily::default(),
            filter_order: DEFAULT_FILTER_ORDER,
            carrier,
            mode: SynthesisMode::default(),
            formant_step: 0,
            noise: None,
            normalize: true,
        }
    }

    /// Sets the band spacing.
    pub fn with_spacing(mut self, spacing: SpacingMode) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the filter family.
    pub fn with_filter_family(mut self, family: FilterFamily) -> Self {
        self.filter_family = family;
        self
    }

    /// Sets the filter order (Q for biquads).
    pub fn with_filter_order(mut self, order: f64) -> Self {
        self.filter_order = order;
        self
    }

    /// Sets the synthesis mode.
    pub fn with_mode(mut self, mode: SynthesisMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the formant step.
    pub fn with_formant_step(mut self, step: i32) -> Self {
        self.formant_step = step;
        self
    }

    /// Enables noise injection.
    pub fn with_noise(mut self, noise: NoiseInjection) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Turns peak normalization on or off.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Validates the config.
    pub fn validate(&self) -> ValidationResult {
        validate_config(self)
    }

    /// Parses a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the config to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_minimal_json() {
        let json = r#"{
            "channel_count": 16,
            "sample_rate": 44100,
            "carrier": {"shape": "sawtooth", "frequency": {"type": "fixed", "frequency": 220.0}}
        }"#;
        let config = VocoderConfig::from_json(json).unwrap();

        assert_eq!(config, VocoderConfig::new(16, 44100, CarrierSpec::sawtooth(220.0)));
        assert_eq!(config.filter_order, 5.0);
        assert!(config.normalize);
        assert_eq!(config.mode, SynthesisMode::TimeDomain);
    }

    #[test]
    fn test_spectral_mode_defaults() {
        let json = r#"{"spectral": {}}"#;
        let mode: SynthesisMode = serde_json::from_str(json).unwrap();
        assert_eq!(mode, SynthesisMode::Spectral(SpectralParams::default()));
    }

    #[test]
    fn test_noise_defaults() {
        let noise: NoiseInjection = serde_json::from_str(r#"{"amplitude": 0.1}"#).unwrap();
        assert_eq!(noise, NoiseInjection::new(0.1));
        assert_eq!(noise.q, 0.707);
        assert_eq!(noise.seed, 0);
    }

    #[test]
    fn test_builder_roundtrip_json() {
        let config = VocoderConfig::new(24, 48000, CarrierSpec::square(110.0))
            .with_spacing(SpacingMode::Mel)
            .with_filter_family(FilterFamily::Chebyshev1)
            .with_filter_order(4.0)
            .with_mode(SynthesisMode::Spectral(SpectralParams {
                frame_size: 2048,
                hop_size: 512,
                balance: 0.5,
            }))
            .with_formant_step(-2)
            .with_noise(NoiseInjection::new(0.05).with_seed(9))
            .with_normalize(false);

        let json = config.to_json_pretty().unwrap();
        let parsed = VocoderConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_noise_omitted_when_none() {
        let config = VocoderConfig::new(8, 44100, CarrierSpec::sawtooth(440.0));
        let json = config.to_json().unwrap();
        assert!(!json.contains("noise"));
    }

    #[test]
    fn test_noise_cutoff_is_band_midpoint() {
        assert_eq!(NOISE_CUTOFF_HZ, 12000.0);
    }
}
