//! Band-pass filter description types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, SpecError, ValidationError};

/// Band-pass filter design family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFamily {
    /// Maximally flat passband.
    #[default]
    Butterworth,
    /// Chebyshev type I with a fixed 1 dB passband ripple.
    Chebyshev1,
    /// Phase-preserving Bessel design.
    Bessel,
    /// Single analytic biquad; the order is read as the quality factor.
    Biquad,
}

impl FilterFamily {
    /// Returns true for families that are designed as cascaded sections of a given order.
    pub fn is_iir_design(&self) -> bool {
        !matches!(self, FilterFamily::Biquad)
    }
}

impl FromStr for FilterFamily {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butter" | "butterworth" => Ok(FilterFamily::Butterworth),
            "cheby1" | "chebyshev1" => Ok(FilterFamily::Chebyshev1),
            "bessel" => Ok(FilterFamily::Bessel),
            "biquad" => Ok(FilterFamily::Biquad),
            other => Err(SpecError::unknown("filter family", other)),
        }
    }
}

/// How band edges are distributed across the Nyquist range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingMode {
    /// Equal-width bands.
    #[default]
    Linear,
    /// Mel-spaced bands, narrower at low frequencies.
    Mel,
}

impl FromStr for SpacingMode {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" | "lin" => Ok(SpacingMode::Linear),
            "mel" => Ok(SpacingMode::Mel),
            other => Err(SpecError::unknown("spacing mode", other)),
        }
    }
}

/// Passband of a single band-pass filter.
///
/// Cutoffs exactly at 0 Hz or at Nyquist are moved to 1 Hz and
/// Nyquist - 1 Hz, since several designs degenerate at the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Lower cutoff in Hz.
    pub low: f64,
    /// Upper cutoff in Hz.
    pub high: f64,
    /// Nyquist frequency in Hz.
    pub nyquist: f64,
    /// Design family.
    pub family: FilterFamily,
    /// Filter order (quality factor for the biquad family).
    pub order: f64,
}

impl FilterSpec {
    /// Creates a filter spec, clamping boundary cutoffs.
    ///
    /// # Arguments
    /// * `low` - Lower cutoff in Hz (>= 0)
    /// * `high` - Upper cutoff in Hz (<= nyquist)
    /// * `nyquist` - Nyquist frequency in Hz
    /// * `family` - Design family
    /// * `order` - Filter order, or Q for biquads
    pub fn new(
        low: f64,
        high: f64,
        nyquist: f64,
        family: FilterFamily,
        order: f64,
    ) -> Result<Self, ValidationError> {
        if !(nyquist.is_finite() && nyquist > 1.0) {
            return Err(ValidationError::new(
                ErrorCode::InvalidSampleRate,
                format!("nyquist must be greater than 1 Hz, got {}", nyquist),
            ));
        }
        if !(low.is_finite() && high.is_finite()) || low < 0.0 || high > nyquist {
            return Err(ValidationError::new(
                ErrorCode::InvalidCutoff,
                format!(
                    "cutoffs must lie in [0, {}], got [{}, {}]",
                    nyquist, low, high
                ),
            ));
        }

        let low = if low == 0.0 { 1.0 } else { low };
        let high = if high == nyquist { nyquist - 1.0 } else { high };

        if low >= high {
            return Err(ValidationError::new(
                ErrorCode::InvalidCutoff,
                format!("low cutoff {} must be below high cutoff {}", low, high),
            ));
        }

        Ok(Self {
            low,
            high,
            nyquist,
            family,
            order,
        })
    }

    /// Cutoffs divided by Nyquist, both in (0, 1).
    pub fn normalized(&self) -> (f64, f64) {
        (self.low / self.nyquist, self.high / self.nyquist)
    }

    /// Arithmetic center of the passband in Hz.
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Sample rate the passband was laid out for.
    pub fn sample_rate(&self) -> f64 {
        self.nyquist * 2.0
    }
}
