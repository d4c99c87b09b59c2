//! IIR band-pass design: analog prototype, band transform, bilinear map, sections.
//!
//! Cutoffs are normalized to Nyquist. The pipeline works in zeros/poles/gain
//! form throughout and only multiplies out into biquads at the end.

use std::cmp::Ordering;
use std::f64::consts::PI;

use chanvoc_spec::FilterFamily;
use rustfft::num_complex::Complex64;

use super::{BiquadCoeffs, SosFilter};
use crate::error::{AudioError, AudioResult};

/// Passband ripple of Chebyshev type I designs in dB.
pub const CHEBYSHEV_RIPPLE_DB: f64 = 1.0;

/// Sample rate the normalized design is carried out at (Nyquist = 1).
const DESIGN_FS: f64 = 2.0;

/// Imaginary parts below this are treated as real roots.
const REAL_TOLERANCE: f64 = 1e-9;

const ROOT_MAX_ITERATIONS: usize = 1000;
const ROOT_TOLERANCE: f64 = 1e-14;

/// Filter in zeros/poles/gain form.
#[derive(Debug, Clone)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

/// Designs a band-pass filter as a cascade of second-order sections.
///
/// # Arguments
/// * `family` - Butterworth, Chebyshev I or Bessel
/// * `order` - Prototype order; the band-pass has `order` sections
/// * `low` - Lower cutoff normalized to Nyquist, in (0, 1)
/// * `high` - Upper cutoff normalized to Nyquist, in (low, 1)
pub fn bandpass_sos(
    family: FilterFamily,
    order: usize,
    low: f64,
    high: f64,
) -> AudioResult<SosFilter> {
    if !(0.0 < low && low < high && high < 1.0) {
        return Err(AudioError::invalid_param(
            "filter.cutoff",
            format!("normalized cutoffs must satisfy 0 < low < high < 1, got [{}, {}]", low, high),
        ));
    }
    if order == 0 {
        return Err(AudioError::invalid_param("filter.order", "must be at least 1"));
    }

    let prototype = analog_prototype(family, order)?;

    let warped_low = prewarp(low);
    let warped_high = prewarp(high);
    let bandwidth = warped_high - warped_low;
    let center = (warped_low * warped_high).sqrt();

    let analog = lowpass_to_bandpass(&prototype, center, bandwidth);
    let digital = bilinear(&analog, DESIGN_FS);
    zpk_to_sos(&digital, digital_frequency(center))
}

/// Normalized-to-Nyquist digital frequency to the matching analog frequency.
fn prewarp(norm_freq: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * norm_freq / DESIGN_FS).tan()
}

/// Analog frequency back to the normalized digital frequency it was warped from.
fn digital_frequency(analog: f64) -> f64 {
    DESIGN_FS / PI * (analog / (2.0 * DESIGN_FS)).atan()
}

/// Low-pass analog prototype with unit cutoff.
pub fn analog_prototype(family: FilterFamily, order: usize) -> AudioResult<Zpk> {
    match family {
        FilterFamily::Butterworth => Ok(butterworth_prototype(order)),
        FilterFamily::Chebyshev1 => Ok(chebyshev1_prototype(order, CHEBYSHEV_RIPPLE_DB)),
        FilterFamily::Bessel => Ok(bessel_prototype(order)),
        FilterFamily::Biquad => Err(AudioError::invalid_param(
            "filter.family",
            "biquad filters are not designed from a prototype",
        )),
    }
}

/// Angles `pi * m / (2n)` for `m = -n+1, -n+3, ..., n-1`.
fn prototype_angles(order: usize) -> impl Iterator<Item = f64> {
    let n = order as i64;
    (0..n).map(move |i| PI * (-n + 1 + 2 * i) as f64 / (2.0 * n as f64))
}

fn butterworth_prototype(order: usize) -> Zpk {
    let poles = prototype_angles(order)
        .map(|theta| -Complex64::from_polar(1.0, theta))
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

fn chebyshev1_prototype(order: usize, ripple_db: f64) -> Zpk {
    let eps = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / order as f64;

    let poles: Vec<Complex64> = prototype_angles(order)
        .map(|theta| -(Complex64::new(mu, theta)).sinh())
        .collect();

    let mut gain = poles.iter().map(|p| -p).product::<Complex64>().re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Zpk {
        zeros: Vec::new(),
        poles,
        gain,
    }
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Bessel prototype with phase-normalized poles (unit DC gain).
fn bessel_prototype(order: usize) -> Zpk {
    let n = order;
    // Reverse Bessel polynomial coefficients, a[k] multiplies s^k
    let a: Vec<f64> = (0..=n)
        .map(|k| factorial(2 * n - k) / (2f64.powi((n - k) as i32) * factorial(k) * factorial(n - k)))
        .collect();

    // Scale s so the constant term becomes 1
    let scale = a[0].powf(1.0 / n as f64);
    let monic: Vec<f64> = a
        .iter()
        .enumerate()
        .map(|(k, &ak)| ak * scale.powi(k as i32 - n as i32))
        .collect();

    let poles = polynomial_roots(&monic)
        .into_iter()
        .map(|p| {
            if p.im.abs() < REAL_TOLERANCE {
                Complex64::new(p.re, 0.0)
            } else {
                p
            }
        })
        .collect();

    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

/// Roots of a monic polynomial (`coeffs[k]` multiplies `x^k`) by Durand-Kerner iteration.
fn polynomial_roots(coeffs: &[f64]) -> Vec<Complex64> {
    let degree = coeffs.len() - 1;
    let eval = |x: Complex64| {
        coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
    };

    let seed = Complex64::new(0.4, 0.9);
    let mut roots: Vec<Complex64> = (0..degree).map(|i| seed.powu(i as u32)).collect();

    for _ in 0..ROOT_MAX_ITERATIONS {
        let mut max_step = 0.0f64;
        for i in 0..degree {
            let denom = (0..degree)
                .filter(|&j| j != i)
                .map(|j| roots[i] - roots[j])
                .product::<Complex64>();
            let step = eval(roots[i]) / denom;
            roots[i] -= step;
            max_step = max_step.max(step.norm() / roots[i].norm().max(1.0));
        }
        if max_step < ROOT_TOLERANCE {
            break;
        }
    }

    roots
}

/// Transforms a low-pass prototype into a band-pass centered at `center` with width `bandwidth`.
pub fn lowpass_to_bandpass(zpk: &Zpk, center: f64, bandwidth: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    let half = bandwidth / 2.0;
    let center_sq = center * center;

    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|r| r * half).collect();
        let offsets: Vec<Complex64> = scaled.iter().map(|r| (r * r - center_sq).sqrt()).collect();
        scaled
            .iter()
            .zip(&offsets)
            .map(|(r, d)| r + d)
            .chain(scaled.iter().zip(&offsets).map(|(r, d)| r - d))
            .collect()
    };

    let mut zeros = split(&zpk.zeros);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: split(&zpk.poles),
        gain: zpk.gain * bandwidth.powi(degree as i32),
    }
}

/// Bilinear transform from the s-plane to the z-plane.
pub fn bilinear(zpk: &Zpk, fs: f64) -> Zpk {
    let fs2 = 2.0 * fs;
    let degree = zpk.poles.len() - zpk.zeros.len();
    let map = |r: &Complex64| (fs2 + *r) / (fs2 - *r);

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(map).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let num = zpk.zeros.iter().map(|z| fs2 - *z).product::<Complex64>();
    let den = zpk.poles.iter().map(|p| fs2 - *p).product::<Complex64>();

    Zpk {
        zeros,
        poles: zpk.poles.iter().map(map).collect(),
        gain: zpk.gain * (num / den).re,
    }
}

fn is_real(root: &Complex64) -> bool {
    root.im.abs() <= REAL_TOLERANCE * root.norm().max(1.0)
}

fn by_real_part(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Pole factor of one section: a conjugate pair, two real poles or a lone real pole.
#[derive(Debug, Clone, Copy)]
enum PoleFactor {
    Conjugate(Complex64),
    RealPair(f64, f64),
    Real(f64),
}

impl PoleFactor {
    /// Pole of the factor closest to the unit circle.
    fn outer(&self) -> Complex64 {
        match *self {
            PoleFactor::Conjugate(p) => p,
            PoleFactor::RealPair(a, b) => {
                Complex64::new(if a.abs() > b.abs() { a } else { b }, 0.0)
            }
            PoleFactor::Real(r) => Complex64::new(r, 0.0),
        }
    }

    fn denominator(&self) -> [f64; 3] {
        match *self {
            PoleFactor::Conjugate(p) => [1.0, -2.0 * p.re, p.norm_sqr()],
            PoleFactor::RealPair(a, b) => [1.0, -(a + b), a * b],
            PoleFactor::Real(r) => [1.0, -r, 0.0],
        }
    }
}

/// Groups poles into section factors.
///
/// Complex poles contribute one factor per conjugate pair. Real poles are
/// sorted and paired smallest with largest; an unpaired real pole gets a
/// first-order factor.
fn pole_factors(poles: &[Complex64]) -> Vec<PoleFactor> {
    let mut factors: Vec<PoleFactor> = poles
        .iter()
        .filter(|p| !is_real(p) && p.im > 0.0)
        .map(|&p| PoleFactor::Conjugate(p))
        .collect();

    let mut reals: Vec<f64> = poles.iter().filter(|p| is_real(p)).map(|p| p.re).collect();
    reals.sort_by(by_real_part);

    let (mut lo, mut hi) = (0usize, reals.len());
    while hi - lo >= 2 {
        factors.push(PoleFactor::RealPair(reals[lo], reals[hi - 1]));
        lo += 1;
        hi -= 1;
    }
    if hi - lo == 1 {
        factors.push(PoleFactor::Real(reals[lo]));
    }

    factors
}

/// Removes and returns the zero nearest to `target` among those accepted by `keep`.
fn take_nearest(
    zeros: &mut Vec<Complex64>,
    target: Complex64,
    keep: impl Fn(&Complex64) -> bool,
) -> Option<Complex64> {
    let index = zeros
        .iter()
        .enumerate()
        .filter(|(_, z)| keep(z))
        .min_by(|(_, a), (_, b)| by_real_part(&(*a - target).norm(), &(*b - target).norm()))
        .map(|(i, _)| i)?;
    Some(zeros.swap_remove(index))
}

/// Numerator built from the zeros nearest to `factor`'s outer pole.
///
/// Takes one zero for a first-order factor and two otherwise, consuming
/// them from `zeros`. A complex zero always brings its conjugate.
fn nearest_numerator(zeros: &mut Vec<Complex64>, factor: &PoleFactor) -> [f64; 3] {
    let target = factor.outer();
    let Some(first) = take_nearest(zeros, target, |_| true) else {
        return [1.0, 0.0, 0.0];
    };

    if !is_real(&first) {
        let conj = first.conj();
        take_nearest(zeros, conj, |_| true);
        return [1.0, -2.0 * first.re, first.norm_sqr()];
    }
    if matches!(factor, PoleFactor::Real(_)) {
        return [1.0, -first.re, 0.0];
    }
    match take_nearest(zeros, target, is_real) {
        Some(second) => [1.0, -(first.re + second.re), first.re * second.re],
        None => [1.0, -first.re, 0.0],
    }
}

/// Multiplies zeros/poles/gain out into a section cascade.
///
/// Each pole factor is paired with its nearest zeros, starting from the
/// poles closest to the unit circle, so a resonance near DC or Nyquist is
/// cancelled by the zeros sitting there. Sections run from the innermost
/// poles to the outermost. Every section is scaled to unit magnitude at
/// `norm_freq` and the remaining overall gain goes on the first section.
///
/// # Arguments
/// * `zpk` - Digital filter in zeros/poles/gain form
/// * `norm_freq` - Normalized frequency (1.0 = Nyquist) the sections are leveled at
pub fn zpk_to_sos(zpk: &Zpk, norm_freq: f64) -> AudioResult<SosFilter> {
    let radius = zpk.poles.iter().map(|p| p.norm()).fold(0.0, f64::max);
    if !(radius < 1.0) {
        return Err(AudioError::UnstableFilter { radius });
    }

    let mut factors = pole_factors(&zpk.poles);
    factors.sort_by(|a, b| by_real_part(&b.outer().norm(), &a.outer().norm()));

    let mut zeros = zpk.zeros.clone();
    let mut sections: Vec<BiquadCoeffs> = factors
        .iter()
        .map(|f| BiquadCoeffs::from_raw(nearest_numerator(&mut zeros, f), f.denominator()))
        .collect();
    sections.reverse();

    let z = Complex64::from_polar(1.0, PI * norm_freq);
    for section in &mut sections {
        let level = section.response(z).norm();
        if level > 0.0 && level.is_finite() {
            section.b0 /= level;
            section.b1 /= level;
            section.b2 /= level;
        }
    }

    // Overall response at z from the roots, alternating zeros and poles to
    // keep the running product in range
    let mut target = Complex64::new(zpk.gain, 0.0);
    for i in 0..zpk.zeros.len().max(zpk.poles.len()) {
        if let Some(r) = zpk.zeros.get(i) {
            target *= z - r;
        }
        if let Some(p) = zpk.poles.get(i) {
            target /= z - p;
        }
    }
    let cascade = sections.iter().map(|s| s.response(z)).product::<Complex64>();
    let ratio = target / cascade;
    let residual = ratio.norm().copysign(ratio.re);

    if let Some(first) = sections.first_mut() {
        first.b0 *= residual;
        first.b1 *= residual;
        first.b2 *= residual;
    }

    SosFilter::new(sections)
}
