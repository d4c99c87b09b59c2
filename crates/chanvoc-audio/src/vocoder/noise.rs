//! Carrier noise injection.

use chanvoc_spec::{ErrorCode, NoiseInjection, ValidationError, NOISE_CUTOFF_HZ};
use rand::Rng;
use tracing::warn;

use crate::error::{AudioError, AudioResult};
use crate::filter::{BiquadCoeffs, BiquadFilter};
use crate::rng::create_component_rng;

/// Seed key for the noise generator.
const NOISE_RNG_KEY: &str = "carrier_noise";

/// Adds filtered white noise to a carrier in place and hard-clips to [-1, 1].
///
/// The noise is uniform in `[-amplitude, amplitude)`, seeded from
/// `noise.seed`, and shaped by the resonant biquad at
/// [`NOISE_CUTOFF_HZ`] (clamped below Nyquist for low sample rates).
///
/// # Arguments
/// * `carrier` - Carrier samples, modified in place
/// * `noise` - Noise amplitude, filter Q and seed
/// * `sample_rate` - Sample rate in Hz
pub fn inject_noise(
    carrier: &mut [f64],
    noise: &NoiseInjection,
    sample_rate: u32,
) -> AudioResult<()> {
    if !(noise.amplitude > 0.0 && noise.amplitude <= 1.0) {
        return Err(ValidationError::with_path(
            ErrorCode::InvalidNoiseAmplitude,
            format!("noise amplitude must be in (0, 1], got {}", noise.amplitude),
            "noise.amplitude",
        )
        .into());
    }
    if !(noise.q.is_finite() && noise.q > 0.0) {
        return Err(ValidationError::with_path(
            ErrorCode::InvalidNoiseQ,
            format!("noise filter Q must be positive, got {}", noise.q),
            "noise.q",
        )
        .into());
    }

    let nyquist = sample_rate as f64 / 2.0;
    let mut cutoff = NOISE_CUTOFF_HZ;
    if cutoff >= nyquist {
        cutoff = nyquist - 1.0;
        warn!(
            requested = NOISE_CUTOFF_HZ,
            cutoff, sample_rate, "noise cutoff clamped below Nyquist"
        );
    }
    if cutoff <= 0.0 {
        return Err(AudioError::invalid_param(
            "sample_rate",
            format!("too low for noise injection: {}", sample_rate),
        ));
    }

    let mut rng = create_component_rng(noise.seed, NOISE_RNG_KEY);
    let mut filter = BiquadFilter::new(BiquadCoeffs::resonant_bandpass(
        cutoff,
        noise.q,
        sample_rate as f64,
    ));

    for sample in carrier.iter_mut() {
        let white = rng.gen_range(-1.0..1.0) * noise.amplitude;
        *sample = (*sample + filter.process(white)).clamp(-1.0, 1.0);
    }

    Ok(())
}
