//! Carrier oscillators.
//!
//! All synthetic carriers share one bipolar phase accumulator: the phase
//! moves by `2 * f / sample_rate` per sample and wraps from above 1 back by
//! 2, so it stays in (-1, 1]. Square output is derived from the phase sign.

use std::path::Path;

use chanvoc_spec::{FrequencySpec, OscillatorShape};
use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::loader::{SampleLoader, WavFileLoader};

/// Amplitude of the square carrier.
pub const SQUARE_AMPLITUDE: f64 = 0.9;

/// Bipolar phase accumulator.
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    phase: f64,
    sample_rate: f64,
}

impl PhaseAccumulator {
    /// Creates a new phase accumulator starting at phase 0.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Advances by one sample at `frequency` and returns the new phase.
    ///
    /// Whole cycles are dropped from the step before it is added, so any
    /// finite frequency wraps in constant time.
    #[inline]
    pub fn advance(&mut self, frequency: f64) -> f64 {
        let cycles = (frequency / self.sample_rate).rem_euclid(1.0);
        self.phase += 2.0 * cycles;
        if self.phase > 1.0 {
            self.phase -= 2.0;
        }
        self.phase
    }

    /// Current phase in (-1, 1].
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Resets the phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Sawtooth sample for a bipolar phase (the phase itself).
#[inline]
pub fn sawtooth(phase: f64) -> f64 {
    phase
}

/// Square sample for a bipolar phase.
#[inline]
pub fn square(phase: f64) -> f64 {
    if phase > 0.0 {
        SQUARE_AMPLITUDE
    } else {
        -SQUARE_AMPLITUDE
    }
}

fn check_frequency(frequency: &FrequencySpec) -> AudioResult<()> {
    for (_, freq) in frequency.endpoints() {
        if !(freq.is_finite() && freq > 0.0) {
            return Err(AudioError::InvalidFrequency { freq });
        }
    }
    Ok(())
}

/// Runs the phase accumulator over a frequency trajectory.
fn render_phase(
    frequency: &FrequencySpec,
    num_samples: usize,
    sample_rate: f64,
    waveform: fn(f64) -> f64,
) -> Vec<f64> {
    let mut acc = PhaseAccumulator::new(sample_rate);
    match *frequency {
        FrequencySpec::Fixed { frequency } => (0..num_samples)
            .map(|_| waveform(acc.advance(frequency)))
            .collect(),
        FrequencySpec::Sweep { .. } => frequency
            .trajectory(num_samples)
            .into_iter()
            .map(|f| waveform(acc.advance(f)))
            .collect(),
    }
}

/// Synthesizes a carrier of exactly `num_samples` samples.
///
/// Sampled carriers are read from disk with [`WavFileLoader`].
///
/// # Arguments
/// * `shape` - Oscillator shape
/// * `frequency` - Frequency spec (ignored for sampled carriers)
/// * `num_samples` - Output length in samples
/// * `sample_rate` - Sample rate in Hz
pub fn synthesize_carrier(
    shape: &OscillatorShape,
    frequency: &FrequencySpec,
    num_samples: usize,
    sample_rate: u32,
) -> AudioResult<Vec<f64>> {
    synthesize_carrier_with(&WavFileLoader, shape, frequency, num_samples, sample_rate)
}

/// Synthesizes a carrier, reading sampled carriers through `loader`.
pub fn synthesize_carrier_with(
    loader: &dyn SampleLoader,
    shape: &OscillatorShape,
    frequency: &FrequencySpec,
    num_samples: usize,
    sample_rate: u32,
) -> AudioResult<Vec<f64>> {
    if sample_rate == 0 {
        return Err(AudioError::invalid_param("sample_rate", "must be positive"));
    }
    let sr = sample_rate as f64;

    let carrier = match shape {
        OscillatorShape::Sawtooth => {
            check_frequency(frequency)?;
            render_phase(frequency, num_samples, sr, sawtooth)
        }
        OscillatorShape::Square => {
            check_frequency(frequency)?;
            render_phase(frequency, num_samples, sr, square)
        }
        OscillatorShape::SweptSawtooth => {
            if !frequency.is_sweep() {
                return Err(AudioError::invalid_param(
                    "carrier.frequency",
                    "swept_sawtooth requires a sweep",
                ));
            }
            check_frequency(frequency)?;
            render_phase(frequency, num_samples, sr, sawtooth)
        }
        OscillatorShape::Sampled { path } => {
            load_sampled(loader, path, num_samples, sample_rate)?
        }
    };

    debug!(shape = ?shape, samples = num_samples, "synthesized carrier");
    Ok(carrier)
}

fn load_sampled(
    loader: &dyn SampleLoader,
    path: &Path,
    num_samples: usize,
    sample_rate: u32,
) -> AudioResult<Vec<f64>> {
    let mut samples = loader.load(path, sample_rate, num_samples)?;
    // Short files are padded with silence
    samples.resize(num_samples, 0.0);
    Ok(samples)
}
