//! ADSR amplitude envelope.
//!
//! Attack is a linear ramp from 0 to 1. Decay and release are geometric
//! ramps, release ending at [`RELEASE_FLOOR`]. Short notes collapse the
//! envelope: without room for decay, attack goes straight into release;
//! without room for sustain, decay is cut short and release starts from
//! wherever it stopped.

use crate::error::{AudioError, AudioResult};

/// Level the release ramp ends at.
pub const RELEASE_FLOOR: f64 = 0.001;

/// ADSR envelope parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level in (0.0, 1.0].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.08,
            decay: 0.3,
            sustain: 0.6,
            release: 0.4,
        }
    }
}

/// The four parts of a rendered envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvelopeSegments {
    pub attack: Vec<f64>,
    pub decay: Vec<f64>,
    pub sustain: Vec<f64>,
    pub release: Vec<f64>,
}

impl EnvelopeSegments {
    /// Total length of all segments in samples.
    pub fn len(&self) -> usize {
        self.attack.len() + self.decay.len() + self.sustain.len() + self.release.len()
    }

    /// Returns true if every segment is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Joins the segments and pads or cuts to `duration` samples.
    pub fn concat(&self, duration: usize) -> Vec<f64> {
        let mut env = Vec::with_capacity(duration.max(self.len()));
        env.extend_from_slice(&self.attack);
        env.extend_from_slice(&self.decay);
        env.extend_from_slice(&self.sustain);
        env.extend_from_slice(&self.release);
        env.resize(duration, 0.0);
        env
    }
}

/// Seconds to whole samples, truncating.
fn to_samples(seconds: f64, sample_rate: f64) -> usize {
    (seconds * sample_rate) as usize
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// `n` geometrically spaced values from `start` to `stop` inclusive.
fn geomspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let mut values: Vec<f64> = linspace(start.log10(), stop.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect();
    if let Some(first) = values.first_mut() {
        *first = start;
    }
    if n > 1 {
        values[n - 1] = stop;
    }
    values
}

impl AdsrParams {
    /// Creates new ADSR parameters.
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    fn validate(&self, sample_rate: u32) -> AudioResult<()> {
        for (name, value) in [
            ("adsr.attack", self.attack),
            ("adsr.decay", self.decay),
            ("adsr.release", self.release),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AudioError::invalid_param(
                    name,
                    format!("must be a non-negative time, got {}", value),
                ));
            }
        }
        if !(self.sustain > 0.0 && self.sustain <= 1.0) {
            return Err(AudioError::invalid_param(
                "adsr.sustain",
                format!("must be in (0, 1], got {}", self.sustain),
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_param("sample_rate", "must be positive"));
        }
        Ok(())
    }

    /// Computes the envelope segments for a note of `duration` samples.
    pub fn segments(&self, duration: usize, sample_rate: u32) -> AudioResult<EnvelopeSegments> {
        self.validate(sample_rate)?;

        let sr = sample_rate as f64;
        let dur = duration as f64;
        let attack_len = to_samples(self.attack, sr);
        let decay_len = to_samples(self.decay, sr);
        let release_len = to_samples(self.release, sr);

        if dur < self.attack * sr {
            return Err(AudioError::InvalidDuration {
                samples: duration,
                required: attack_len,
            });
        }

        let attack = linspace(0.0, 1.0, attack_len);

        if dur < (self.attack + self.release) * sr {
            // No decay or sustain: attack, then as much release as fits
            let mut release = geomspace(1.0, RELEASE_FLOOR, release_len);
            release.truncate(duration.saturating_sub(attack_len));
            return Ok(EnvelopeSegments {
                attack,
                release,
                ..Default::default()
            });
        }

        if dur < (self.attack + self.decay + self.release) * sr {
            // No sustain: cut the decay short and release from where it stopped
            let room = duration.saturating_sub(attack_len + release_len);
            let mut decay = geomspace(1.0, self.sustain, decay_len);
            decay.truncate(room);
            let release_from = decay.last().copied().unwrap_or(1.0);
            let release = geomspace(release_from, RELEASE_FLOOR, release_len);
            return Ok(EnvelopeSegments {
                attack,
                decay,
                release,
                ..Default::default()
            });
        }

        let sustain_len = duration.saturating_sub(attack_len + decay_len + release_len);
        Ok(EnvelopeSegments {
            attack,
            decay: geomspace(1.0, self.sustain, decay_len),
            sustain: vec![self.sustain; sustain_len],
            release: geomspace(self.sustain, RELEASE_FLOOR, release_len),
        })
    }

    /// Renders the envelope, zero-padded to exactly `duration` samples.
    pub fn render(&self, duration: usize, sample_rate: u32) -> AudioResult<Vec<f64>> {
        Ok(self.segments(duration, sample_rate)?.concat(duration))
    }
}

/// Renders an ADSR envelope of `duration_samples` samples.
///
/// # Arguments
/// * `duration_samples` - Note length in samples
/// * `attack_s` - Attack time in seconds
/// * `decay_s` - Decay time in seconds
/// * `sustain_level` - Sustain level in (0, 1]
/// * `release_s` - Release time in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn adsr_envelope(
    duration_samples: usize,
    attack_s: f64,
    decay_s: f64,
    sustain_level: f64,
    release_s: f64,
    sample_rate: u32,
) -> AudioResult<Vec<f64>> {
    AdsrParams::new(attack_s, decay_s, sustain_level, release_s).render(duration_samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn is_non_increasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[1] <= w[0] + 1e-12)
    }

    #[test]
    fn test_default_params() {
        let params = AdsrParams::default();
        assert_eq!(params, AdsrParams::new(0.08, 0.3, 0.6, 0.4));
    }

    #[test]
    fn test_full_envelope_segments() {
        // 1 kHz keeps the sample counts easy to follow
        let params = AdsrParams::new(0.01, 0.02, 0.5, 0.03);
        let seg = params.segments(100, 1000).unwrap();

        assert_eq!(seg.attack.len(), 10);
        assert_eq!(seg.decay.len(), 20);
        assert_eq!(seg.sustain.len(), 40);
        assert_eq!(seg.release.len(), 30);

        assert_eq!(seg.attack[0], 0.0);
        assert_eq!(seg.attack[9], 1.0);
        assert!((seg.decay[0] - 1.0).abs() < 1e-12);
        assert!((seg.decay[19] - 0.5).abs() < 1e-12);
        assert!(seg.sustain.iter().all(|&v| v == 0.5));
        assert!((seg.release[29] - RELEASE_FLOOR).abs() < 1e-12);
        assert!(is_non_increasing(&seg.decay));
        assert!(is_non_increasing(&seg.release));
    }

    #[test]
    fn test_attack_release_collapse() {
        let params = AdsrParams::new(0.01, 0.02, 0.5, 0.03);
        let seg = params.segments(25, 1000).unwrap();

        assert!(seg.decay.is_empty());
        assert!(seg.sustain.is_empty());
        assert_eq!(seg.release.len(), 15);
        // Truncated from the full-length ramp, not squeezed
        let full = geomspace(1.0, RELEASE_FLOOR, 30);
        assert_eq!(seg.release, full[..15].to_vec());
    }

    #[test]
    fn test_skip_sustain_collapse() {
        let params = AdsrParams::new(0.01, 0.02, 0.5, 0.03);
        let seg = params.segments(50, 1000).unwrap();

        assert_eq!(seg.decay.len(), 10);
        assert!(seg.sustain.is_empty());
        assert_eq!(seg.release.len(), 30);
        assert_eq!(seg.release[0], *seg.decay.last().unwrap());
        assert_eq!(seg.len(), 50);
    }

    #[test]
    fn test_skip_sustain_with_no_decay_room_releases_from_one() {
        let params = AdsrParams::new(0.01, 0.02, 0.5, 0.03);
        let seg = params.segments(40, 1000).unwrap();

        assert!(seg.decay.is_empty());
        assert!((seg.release[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_short_for_attack() {
        let err = adsr_envelope(100, 0.08, 0.3, 0.6, 0.4, 44100).unwrap_err();
        assert!(matches!(
            err,
            AudioError::InvalidDuration {
                samples: 100,
                required: 3528
            }
        ));
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_sustain() {
        assert!(adsr_envelope(1000, 0.001, 0.001, 0.0, 0.001, 44100).is_err());
        assert!(adsr_envelope(1000, 0.001, 0.001, 1.5, 0.001, 44100).is_err());
    }

    #[test]
    fn test_render_length_always_matches() {
        let params = AdsrParams::default();
        for duration in [5000, 21168, 30000, 34398, 88200] {
            let env = params.render(duration, 44100).unwrap();
            assert_eq!(env.len(), duration);
        }
    }

    #[test]
    fn test_zero_length_segments() {
        let seg = AdsrParams::new(0.0, 0.0, 1.0, 0.0).segments(10, 44100).unwrap();
        assert_eq!(seg.sustain, vec![1.0; 10]);
        assert!(seg.attack.is_empty() && seg.decay.is_empty() && seg.release.is_empty());
    }
}
