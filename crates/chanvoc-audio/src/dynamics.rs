//! Dynamics processing: static compressor and downward expander.
//!
//! Both work on whole signals in the log domain relative to the signal's own
//! peak, then rescale so the output peak matches the input peak. There is no
//! attack or release smoothing; the gain law is applied per sample.

use crate::error::{AudioError, AudioResult};

/// Level of a sample in dB relative to `peak`, as `10 * log10(|x| / peak)`.
fn relative_db(sample: f64, peak: f64) -> f64 {
    10.0 * (sample.abs() / peak).log10()
}

fn check_ratio(name: &str, ratio: f64) -> AudioResult<()> {
    if !(ratio.is_finite() && ratio >= 1.0) {
        return Err(AudioError::invalid_param(
            name,
            format!("must be a finite value >= 1.0, got {}", ratio),
        ));
    }
    Ok(())
}

/// Runs `law` over the dB level of every non-zero sample and restores the
/// input's peak and signs.
fn apply_gain_law(signal: &[f64], law: impl Fn(f64) -> f64) -> Vec<f64> {
    let peak = signal.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
    if peak == 0.0 {
        return signal.to_vec();
    }

    let magnitudes: Vec<f64> = signal
        .iter()
        .map(|&s| {
            if s == 0.0 {
                0.0
            } else {
                peak * 10f64.powf(law(relative_db(s, peak)) / 10.0)
            }
        })
        .collect();

    let shaped_peak = magnitudes.iter().fold(0.0f64, |m, &s| m.max(s));
    let scale = if shaped_peak > 0.0 { peak / shaped_peak } else { 1.0 };

    magnitudes
        .iter()
        .zip(signal)
        .map(|(&mag, &s)| (mag * scale).copysign(s))
        .collect()
}

/// Compresses levels above `threshold_db` by `ratio`.
///
/// # Arguments
/// * `signal` - Input samples
/// * `threshold_db` - Threshold in dB relative to the signal peak (usually negative)
/// * `ratio` - Compression ratio, >= 1.0 (1.0 leaves the signal unchanged)
pub fn compress(signal: &[f64], threshold_db: f64, ratio: f64) -> AudioResult<Vec<f64>> {
    check_ratio("compressor.ratio", ratio)?;
    if !threshold_db.is_finite() {
        return Err(AudioError::invalid_param(
            "compressor.threshold_db",
            format!("must be finite, got {}", threshold_db),
        ));
    }

    Ok(apply_gain_law(signal, |db| {
        if db > threshold_db {
            (db - threshold_db) / ratio + threshold_db
        } else {
            db
        }
    }))
}

/// Expands levels below `threshold_db` by `ratio`, pushing quiet samples
/// further down. With a large ratio this acts as a noise gate.
///
/// The distance below the threshold is multiplied by `ratio`. Formulations
/// that divide it instead pull quiet samples up toward the threshold, so
/// output differs from those for any ratio above 1.
///
/// # Arguments
/// * `signal` - Input samples
/// * `threshold_db` - Threshold in dB relative to the signal peak
/// * `ratio` - Expansion ratio, >= 1.0 (1.0 leaves the signal unchanged)
pub fn expand(signal: &[f64], threshold_db: f64, ratio: f64) -> AudioResult<Vec<f64>> {
    check_ratio("expander.ratio", ratio)?;
    if !threshold_db.is_finite() {
        return Err(AudioError::invalid_param(
            "expander.threshold_db",
            format!("must be finite, got {}", threshold_db),
        ));
    }

    Ok(apply_gain_law(signal, |db| {
        if db < threshold_db {
            (db - threshold_db) * ratio + threshold_db
        } else {
            db
        }
    }))
}
