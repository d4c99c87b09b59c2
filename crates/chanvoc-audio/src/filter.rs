//! Band-pass filters built from second-order sections.
//!
//! Designed IIR filters (Butterworth, Chebyshev I, Bessel) are stored as a
//! cascade of normalized biquads. The biquad family is a single section
//! computed analytically from the band center and a quality factor.

pub mod design;

use std::f64::consts::PI;

use chanvoc_spec::{FilterFamily, FilterSpec};
use rustfft::num_complex::Complex64;

use crate::error::{AudioError, AudioResult};

/// Biquad filter coefficients, normalized so that `a0 == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Creates coefficients from raw numerator and denominator, dividing through by `a[0]`.
    pub fn from_raw(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b0: b[0] / a0,
            b1: b[1] / a0,
            b2: b[2] / a0,
            a1: a[1] / a0,
            a2: a[2] / a0,
        }
    }

    /// Creates the resonant biquad used for the biquad family and for carrier noise.
    ///
    /// The numerator is the low-pass prototype `(1 - cos w) * [1, 2, 1]`
    /// over the resonant denominator, which peaks near `center` with a
    /// bandwidth set by `q`. The response is low-pass shaped below the
    /// center (DC gain of 2) rather than a true band-pass.
    ///
    /// # Arguments
    /// * `center` - Center frequency in Hz
    /// * `q` - Quality factor
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn resonant_bandpass(center: f64, q: f64, sample_rate: f64) -> Self {
        let theta = 2.0 * PI * center / sample_rate;
        let cos_theta = theta.cos();
        let alpha = theta.sin() / (2.0 * q);

        let gain = 1.0 - cos_theta;
        Self::from_raw(
            [gain, 2.0 * gain, gain],
            [1.0 + alpha, -2.0 * cos_theta, 1.0 - alpha],
        )
    }

    /// Complex response at `z`.
    pub(crate) fn response(&self, z: Complex64) -> Complex64 {
        let z1 = z.inv();
        let z2 = z1 * z1;
        (self.b0 + z1 * self.b1 + z2 * self.b2) / (1.0 + z1 * self.a1 + z2 * self.a2)
    }

    /// Magnitude response at a normalized frequency (1.0 = Nyquist).
    pub fn magnitude_at(&self, norm_freq: f64) -> f64 {
        self.response(Complex64::from_polar(1.0, PI * norm_freq)).norm()
    }

    /// Largest pole radius of the section.
    pub fn pole_radius(&self) -> f64 {
        let disc = Complex64::new(self.a1 * self.a1 - 4.0 * self.a2, 0.0).sqrt();
        let p1 = (-self.a1 + disc) / 2.0;
        let p2 = (-self.a1 - disc) / 2.0;
        p1.norm().max(p2.norm())
    }
}

/// Biquad filter state (direct form I).
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadFilter {
    /// Creates a new biquad filter with the given coefficients.
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Resets the filter state.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Processes a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Processes a buffer of samples in place.
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Processes a buffer of samples, returning a new buffer.
    pub fn process_buffer_copy(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&s| self.process(s)).collect()
    }
}

/// A cascade of second-order sections.
///
/// The filter holds coefficients only; every `apply` starts from zero state,
/// so one instance can be shared across threads and channels.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<BiquadCoeffs>,
}

impl SosFilter {
    /// Creates a cascade, rejecting sections with poles on or outside the unit circle.
    pub fn new(sections: Vec<BiquadCoeffs>) -> AudioResult<Self> {
        let radius = sections
            .iter()
            .map(BiquadCoeffs::pole_radius)
            .fold(0.0, f64::max);
        if !(radius < 1.0) {
            return Err(AudioError::UnstableFilter { radius });
        }
        Ok(Self { sections })
    }

    /// The sections, in processing order.
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Filters a signal through every section in turn.
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let mut output = signal.to_vec();
        for coeffs in &self.sections {
            BiquadFilter::new(*coeffs).process_buffer(&mut output);
        }
        output
    }

    /// Magnitude response at a normalized frequency (1.0 = Nyquist).
    pub fn magnitude_at(&self, norm_freq: f64) -> f64 {
        self.sections
            .iter()
            .map(|s| s.magnitude_at(norm_freq))
            .product()
    }
}

/// A designed band-pass filter for one passband.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    spec: FilterSpec,
    sos: SosFilter,
}

impl BandpassFilter {
    /// Designs a band-pass filter for the given spec.
    pub fn design(spec: &FilterSpec) -> AudioResult<Self> {
        let sos = match spec.family {
            FilterFamily::Biquad => {
                if !(spec.order.is_finite() && spec.order > 0.0) {
                    return Err(AudioError::invalid_param(
                        "filter.q",
                        format!("must be positive, got {}", spec.order),
                    ));
                }
                let coeffs =
                    BiquadCoeffs::resonant_bandpass(spec.center(), spec.order, spec.sample_rate());
                SosFilter::new(vec![coeffs])?
            }
            family => {
                if !(spec.order.fract() == 0.0 && spec.order >= 1.0) {
                    return Err(AudioError::invalid_param(
                        "filter.order",
                        format!("must be a positive integer, got {}", spec.order),
                    ));
                }
                let (low, high) = spec.normalized();
                design::bandpass_sos(family, spec.order as usize, low, high)?
            }
        };

        Ok(Self { spec: *spec, sos })
    }

    /// The passband this filter was designed for.
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// The underlying section cascade.
    pub fn sos(&self) -> &SosFilter {
        &self.sos
    }

    /// Filters a signal.
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        self.sos.apply(signal)
    }

    /// Magnitude response at a frequency in Hz.
    pub fn magnitude_at_hz(&self, freq: f64) -> f64 {
        self.sos.magnitude_at(freq / self.spec.nyquist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    fn rms(signal: &[f64]) -> f64 {
        (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
    }

    #[test]
    fn test_resonant_bandpass_closed_form() {
        let sr = 44100.0;
        let center = 1000.0;
        let q = 2.0;
        let c = BiquadCoeffs::resonant_bandpass(center, q, sr);

        let theta = 2.0 * PI * center / sr;
        let alpha = theta.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;
        let g = 1.0 - theta.cos();

        assert!((c.b0 - g / a0).abs() < 1e-15);
        assert!((c.b1 - 2.0 * g / a0).abs() < 1e-15);
        assert!((c.b2 - g / a0).abs() < 1e-15);
        assert!((c.a1 + 2.0 * theta.cos() / a0).abs() < 1e-15);
        assert!((c.a2 - (1.0 - alpha) / a0).abs() < 1e-15);
    }

    #[test]
    fn test_resonant_bandpass_dc_gain_is_two() {
        let c = BiquadCoeffs::resonant_bandpass(1000.0, 0.707, 44100.0);
        assert!((c.magnitude_at(0.0) - 2.0).abs() < 1e-9);
        assert!(c.magnitude_at(1.0) < 1e-9);
    }

    #[test]
    fn test_biquad_filter_matches_sos_apply() {
        let coeffs = BiquadCoeffs::resonant_bandpass(500.0, 1.0, 8000.0);
        let input = sine(300.0, 8000.0, 256);

        let direct = BiquadFilter::new(coeffs).process_buffer_copy(&input);
        let sos = SosFilter::new(vec![coeffs]).unwrap().apply(&input);

        assert_eq!(direct, sos);
    }

    #[test]
    fn test_biquad_reset() {
        let mut filter = BiquadFilter::new(BiquadCoeffs::resonant_bandpass(500.0, 1.0, 8000.0));
        let first = filter.process(1.0);
        filter.process(0.5);
        filter.reset();
        assert_eq!(filter.process(1.0), first);
    }

    #[test]
    fn test_sos_rejects_unstable_section() {
        let unstable = BiquadCoeffs::from_raw([1.0, 0.0, 0.0], [1.0, 0.0, -1.21]);
        let err = SosFilter::new(vec![unstable]).unwrap_err();
        assert!(matches!(err, AudioError::UnstableFilter { radius } if (radius - 1.1).abs() < 1e-9));
    }

    #[test]
    fn test_sos_apply_is_stateless() {
        let spec = FilterSpec::new(500.0, 2000.0, 22050.0, FilterFamily::Butterworth, 4.0).unwrap();
        let filter = BandpassFilter::design(&spec).unwrap();
        let input = sine(1000.0, 44100.0, 1024);

        assert_eq!(filter.apply(&input), filter.apply(&input));
    }

    #[test]
    fn test_bandpass_passes_center_and_rejects_far_tones() {
        let sr = 44100.0;
        let spec = FilterSpec::new(800.0, 1600.0, sr / 2.0, FilterFamily::Butterworth, 5.0).unwrap();
        let filter = BandpassFilter::design(&spec).unwrap();

        let n = 8820;
        let inband = filter.apply(&sine(1130.0, sr, n));
        let below = filter.apply(&sine(100.0, sr, n));
        let above = filter.apply(&sine(8000.0, sr, n));

        // Skip the transient
        let tail = n / 2;
        let in_rms = rms(&inband[tail..]);
        assert!(in_rms > 0.6, "in-band rms {in_rms}");
        assert!(rms(&below[tail..]) < 0.01);
        assert!(rms(&above[tail..]) < 0.01);
    }

    #[test]
    fn test_biquad_family_uses_order_as_q() {
        let spec = FilterSpec::new(1000.0, 3000.0, 22050.0, FilterFamily::Biquad, 0.707).unwrap();
        let filter = BandpassFilter::design(&spec).unwrap();

        assert_eq!(filter.sos().sections().len(), 1);
        assert_eq!(
            filter.sos().sections()[0],
            BiquadCoeffs::resonant_bandpass(2000.0, 0.707, 44100.0)
        );
    }

    #[test]
    fn test_fractional_order_rejected_for_iir() {
        let spec = FilterSpec::new(1000.0, 3000.0, 22050.0, FilterFamily::Bessel, 2.5).unwrap();
        let err = BandpassFilter::design(&spec).unwrap_err();
        assert!(err.is_validation());
    }
}
