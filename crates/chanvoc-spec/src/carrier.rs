//! Carrier configuration types: oscillator shapes and frequency specs.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Exponent of the power-law sweep.
pub const POWER_SWEEP_EXPONENT: f64 = 0.2;

/// Interpolation law for a start/stop frequency sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepLaw {
    /// Straight line between start and stop.
    #[default]
    Linear,
    /// Log of linearly spaced exponentials (slow start, late rise).
    Logarithmic,
    /// Exponential of linearly spaced logarithms (constant pitch rate).
    Exponential,
    /// `start + (stop - start) * t^0.2` (fast early rise).
    Power,
}

impl SweepLaw {
    /// Interpolates between start and stop at progress `t` in [0, 1].
    pub fn interpolate(&self, start: f64, stop: f64, t: f64) -> f64 {
        match self {
            SweepLaw::Linear => start + (stop - start) * t,
            SweepLaw::Logarithmic => {
                // ln((1 - t) * e^start + t * e^stop), shifted so neither exponential overflows
                let m = start.max(stop);
                m + ((start - m).exp() * (1.0 - t) + (stop - m).exp() * t).ln()
            }
            SweepLaw::Exponential => {
                let log_start = start.ln();
                let log_stop = stop.ln();
                (log_start + (log_stop - log_start) * t).exp()
            }
            SweepLaw::Power => start + (stop - start) * t.powf(POWER_SWEEP_EXPONENT),
        }
    }

    /// Short name used in carrier names (`log_sawtooth`, ...).
    pub fn short_name(&self) -> &'static str {
        match self {
            SweepLaw::Linear => "lin",
            SweepLaw::Logarithmic => "log",
            SweepLaw::Exponential => "exp",
            SweepLaw::Power => "pow",
        }
    }
}

impl FromStr for SweepLaw {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lin" | "linear" => Ok(SweepLaw::Linear),
            "log" | "logarithmic" => Ok(SweepLaw::Logarithmic),
            "exp" | "exponential" => Ok(SweepLaw::Exponential),
            "pow" | "power" => Ok(SweepLaw::Power),
            other => Err(SpecError::unknown("sweep law", other)),
        }
    }
}

/// Frequency of an oscillator over the signal duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequencySpec {
    /// Constant frequency in Hz.
    Fixed {
        /// Frequency in Hz.
        frequency: f64,
    },
    /// Start/stop sweep across the whole duration.
    Sweep {
        /// Frequency at the first sample in Hz.
        start: f64,
        /// Frequency at the last sample in Hz.
        stop: f64,
        /// Interpolation law.
        #[serde(default)]
        law: SweepLaw,
    },
}

impl Default for FrequencySpec {
    fn default() -> Self {
        FrequencySpec::Fixed { frequency: 440.0 }
    }
}

impl FrequencySpec {
    /// Creates a fixed frequency.
    pub fn fixed(frequency: f64) -> Self {
        FrequencySpec::Fixed { frequency }
    }

    /// Creates a sweep.
    pub fn sweep(start: f64, stop: f64, law: SweepLaw) -> Self {
        FrequencySpec::Sweep { start, stop, law }
    }

    /// Returns true for the sweep variant.
    pub fn is_sweep(&self) -> bool {
        matches!(self, FrequencySpec::Sweep { .. })
    }

    /// Frequency at progress `t` in [0, 1].
    pub fn at(&self, t: f64) -> f64 {
        match *self {
            FrequencySpec::Fixed { frequency } => frequency,
            FrequencySpec::Sweep { start, stop, law } => law.interpolate(start, stop, t),
        }
    }

    /// Per-sample frequency trajectory with the endpoints on the first and last sample.
    pub fn trajectory(&self, num_samples: usize) -> Vec<f64> {
        let divisor = if num_samples > 1 { num_samples - 1 } else { 1 };
        (0..num_samples)
            .map(|i| self.at(i as f64 / divisor as f64))
            .collect()
    }

    /// The defining frequencies with their JSON field names.
    pub fn endpoints(&self) -> Vec<(&'static str, f64)> {
        match *self {
            FrequencySpec::Fixed { frequency } => vec![("frequency", frequency)],
            FrequencySpec::Sweep { start, stop, .. } => vec![("start", start), ("stop", stop)],
        }
    }

    /// Highest frequency reached.
    pub fn peak(&self) -> f64 {
        self.endpoints()
            .iter()
            .map(|&(_, f)| f)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Waveform family of the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorShape {
    /// Bipolar ramp in (-1, 1].
    Sawtooth,
    /// +/-0.9 square driven by the sawtooth phase.
    Square,
    /// Sawtooth that requires a sweep frequency spec.
    SweptSawtooth,
    /// Carrier read from an audio file.
    Sampled {
        /// Path to the audio file.
        path: PathBuf,
    },
}

/// A complete carrier description: shape plus frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierSpec {
    /// Waveform family.
    pub shape: OscillatorShape,
    /// Frequency spec (ignored by sampled carriers).
    #[serde(default)]
    pub frequency: FrequencySpec,
}

impl CarrierSpec {
    /// Fixed-frequency sawtooth.
    pub fn sawtooth(frequency: f64) -> Self {
        Self {
            shape: OscillatorShape::Sawtooth,
            frequency: FrequencySpec::fixed(frequency),
        }
    }

    /// Fixed-frequency square.
    pub fn square(frequency: f64) -> Self {
        Self {
            shape: OscillatorShape::Square,
            frequency: FrequencySpec::fixed(frequency),
        }
    }

    /// Sawtooth swept from `start` to `stop`.
    pub fn swept_sawtooth(start: f64, stop: f64, law: SweepLaw) -> Self {
        Self {
            shape: OscillatorShape::SweptSawtooth,
            frequency: FrequencySpec::sweep(start, stop, law),
        }
    }

    /// Carrier loaded from an audio file.
    pub fn sampled(path: impl Into<PathBuf>) -> Self {
        Self {
            shape: OscillatorShape::Sampled { path: path.into() },
            frequency: FrequencySpec::default(),
        }
    }

    /// Resolves a carrier by name.
    ///
    /// `sawtooth` and `square` take one frequency; `lin_sawtooth`,
    /// `log_sawtooth`, `exp_sawtooth` and `pow_sawtooth` take start and stop.
    /// Any other name refers to `<sample_dir>/<name>.wav`.
    pub fn from_name(name: &str, freqs: &[f64], sample_dir: &Path) -> Result<Self, SpecError> {
        let need = |required: usize| -> Result<(), SpecError> {
            if freqs.len() < required {
                Err(SpecError::MissingFrequency {
                    name: name.to_string(),
                    required,
                    given: freqs.len(),
                })
            } else {
                Ok(())
            }
        };

        match name {
            "sawtooth" => {
                need(1)?;
                Ok(Self::sawtooth(freqs[0]))
            }
            "square" => {
                need(1)?;
                Ok(Self::square(freqs[0]))
            }
            _ => match name.strip_suffix("_sawtooth").map(SweepLaw::from_str) {
                Some(Ok(law)) => {
                    need(2)?;
                    Ok(Self::swept_sawtooth(freqs[0], freqs[1], law))
                }
                _ => Ok(Self::sampled(sample_dir.join(format!("{}.wav", name)))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sweep_law_endpoints() {
        for law in [
            SweepLaw::Linear,
            SweepLaw::Logarithmic,
            SweepLaw::Exponential,
            SweepLaw::Power,
        ] {
            assert!((law.interpolate(220.0, 880.0, 0.0) - 220.0).abs() < 1e-9, "{law:?}");
            assert!((law.interpolate(220.0, 880.0, 1.0) - 880.0).abs() < 1e-9, "{law:?}");
        }
    }

    #[test]
    fn test_sweep_law_midpoints() {
        assert!((SweepLaw::Linear.interpolate(100.0, 400.0, 0.5) - 250.0).abs() < 1e-9);
        // Geometric mean
        assert!((SweepLaw::Exponential.interpolate(100.0, 400.0, 0.5) - 200.0).abs() < 1e-9);
        // 0.5^0.2 = 0.87055...
        let pow_mid = 100.0 + 300.0 * 0.5_f64.powf(0.2);
        assert!((SweepLaw::Power.interpolate(100.0, 400.0, 0.5) - pow_mid).abs() < 1e-9);
        // Dominated by the larger exponential: ln(0.5) + 400
        let log_mid = 400.0 + 0.5_f64.ln();
        assert!((SweepLaw::Logarithmic.interpolate(100.0, 400.0, 0.5) - log_mid).abs() < 1e-9);
    }

    #[test]
    fn test_logarithmic_law_handles_large_frequencies() {
        // e^880 overflows f64; the shifted form must not
        let f = SweepLaw::Logarithmic.interpolate(440.0, 880.0, 0.25);
        assert!(f.is_finite());
        assert!(f > 440.0 && f <= 880.0);
    }

    #[test]
    fn test_trajectory_hits_endpoints() {
        let spec = FrequencySpec::sweep(440.0, 880.0, SweepLaw::Linear);
        let freqs = spec.trajectory(11);

        assert_eq!(freqs.len(), 11);
        assert!((freqs[0] - 440.0).abs() < 1e-9);
        assert!((freqs[5] - 660.0).abs() < 1e-9);
        assert!((freqs[10] - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_trajectory_single_sample() {
        let spec = FrequencySpec::sweep(440.0, 880.0, SweepLaw::Exponential);
        assert_eq!(spec.trajectory(1), vec![440.0]);
        assert!(spec.trajectory(0).is_empty());
    }

    #[test]
    fn test_sweep_law_from_str() {
        assert_eq!("exp".parse::<SweepLaw>().unwrap(), SweepLaw::Exponential);
        assert_eq!("power".parse::<SweepLaw>().unwrap(), SweepLaw::Power);
        assert!("cubic".parse::<SweepLaw>().is_err());
    }

    #[test]
    fn test_carrier_from_name() {
        let dir = Path::new("/carriers");

        assert_eq!(
            CarrierSpec::from_name("sawtooth", &[440.0], dir).unwrap(),
            CarrierSpec::sawtooth(440.0)
        );
        assert_eq!(
            CarrierSpec::from_name("log_sawtooth", &[110.0, 440.0], dir).unwrap(),
            CarrierSpec::swept_sawtooth(110.0, 440.0, SweepLaw::Logarithmic)
        );
        assert_eq!(
            CarrierSpec::from_name("strings", &[], dir).unwrap(),
            CarrierSpec::sampled("/carriers/strings.wav")
        );
    }

    #[test]
    fn test_carrier_from_name_missing_frequency() {
        let err = CarrierSpec::from_name("exp_sawtooth", &[110.0], Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            SpecError::MissingFrequency {
                required: 2,
                given: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_carrier_serde() {
        let carrier = CarrierSpec::swept_sawtooth(110.0, 880.0, SweepLaw::Power);
        let json = serde_json::to_string(&carrier).unwrap();
        assert!(json.contains("swept_sawtooth"));
        assert!(json.contains("\"law\":\"power\""));

        let parsed: CarrierSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, carrier);
    }

    #[test]
    fn test_sampled_carrier_json() {
        let json = r#"{"shape": {"sampled": {"path": "voice.wav"}}}"#;
        let parsed: CarrierSpec = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, CarrierSpec::sampled("voice.wav"));
    }
}
