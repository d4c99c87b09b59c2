//! Filter bank: N contiguous band-pass filters spanning (0, Nyquist].

use chanvoc_spec::{FilterFamily, FilterSpec, SpacingMode, DEFAULT_FILTER_ORDER};
use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::filter::BandpassFilter;

/// Hz to mel.
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Mel to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Returns the `channel_count + 1` band edges in Hz.
///
/// Linear edges are `i * nyquist / channel_count`. Mel edges are evenly
/// spaced on the mel scale between 0 Hz and `nyquist - 1` Hz.
pub fn band_edges(channel_count: usize, nyquist: f64, spacing: SpacingMode) -> Vec<f64> {
    let n = channel_count as f64;
    match spacing {
        SpacingMode::Linear => (0..=channel_count)
            .map(|i| i as f64 * nyquist / n)
            .collect(),
        SpacingMode::Mel => {
            let top = hz_to_mel(nyquist - 1.0);
            (0..=channel_count)
                .map(|i| mel_to_hz(top * i as f64 / n))
                .collect()
        }
    }
}

/// An ordered bank of band-pass filters.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: Vec<BandpassFilter>,
    spacing: SpacingMode,
    sample_rate: u32,
}

/// Builds a filter bank with the default filter order (also the biquad Q).
///
/// # Arguments
/// * `channel_count` - Number of bands
/// * `sample_rate` - Sample rate in Hz
/// * `spacing` - Linear or mel band spacing
/// * `family` - Filter design family
pub fn build_filter_bank(
    channel_count: usize,
    sample_rate: u32,
    spacing: SpacingMode,
    family: FilterFamily,
) -> AudioResult<FilterBank> {
    FilterBank::new(channel_count, sample_rate, spacing, family, DEFAULT_FILTER_ORDER)
}

impl FilterBank {
    /// Builds a filter bank.
    ///
    /// `order` is the filter order, or the quality factor for the biquad family.
    pub fn new(
        channel_count: usize,
        sample_rate: u32,
        spacing: SpacingMode,
        family: FilterFamily,
        order: f64,
    ) -> AudioResult<Self> {
        if channel_count == 0 {
            return Err(AudioError::invalid_param(
                "channel_count",
                "must be at least 1",
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_param("sample_rate", "must be positive"));
        }

        let nyquist = sample_rate as f64 / 2.0;
        let edges = band_edges(channel_count, nyquist, spacing);

        let filters = edges
            .windows(2)
            .map(|band| {
                let spec = FilterSpec::new(band[0], band[1], nyquist, family, order)?;
                BandpassFilter::design(&spec)
            })
            .collect::<AudioResult<Vec<_>>>()?;

        debug!(
            channels = channel_count,
            sample_rate,
            ?spacing,
            ?family,
            order,
            "built filter bank"
        );

        Ok(Self {
            filters,
            spacing,
            sample_rate,
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the bank has no channels.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Band spacing of the bank.
    pub fn spacing(&self) -> SpacingMode {
        self.spacing
    }

    /// Sample rate the bank was designed for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The passband of every channel, in order.
    pub fn specs(&self) -> Vec<FilterSpec> {
        self.filters.iter().map(|f| *f.spec()).collect()
    }

    /// The filter of one channel.
    pub fn filter(&self, channel: usize) -> AudioResult<&BandpassFilter> {
        self.filters
            .get(channel)
            .ok_or(AudioError::ChannelIndexOutOfRange {
                index: channel,
                count: self.filters.len(),
            })
    }

    /// Filters a signal through one channel.
    pub fn apply(&self, signal: &[f64], channel: usize) -> AudioResult<Vec<f64>> {
        Ok(self.filter(channel)?.apply(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_roundtrip_reference_points() {
        assert!(hz_to_mel(0.0).abs() < 1e-12);
        assert!((hz_to_mel(700.0) - 2595.0 * 2f64.log10()).abs() < 1e-9);
        assert!((mel_to_hz(hz_to_mel(1234.5)) - 1234.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_edges() {
        let edges = band_edges(4, 22050.0, SpacingMode::Linear);
        assert_eq!(edges, vec![0.0, 5512.5, 11025.0, 16537.5, 22050.0]);
    }

    #[test]
    fn test_mel_edges_denser_at_low_end() {
        let edges = band_edges(8, 22050.0, SpacingMode::Mel);
        assert_eq!(edges.len(), 9);
        assert!(edges[0].abs() < 1e-9);
        assert!((edges[8] - 22049.0).abs() < 1e-6);

        let widths: Vec<f64> = edges.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_apply_out_of_range() {
        let bank = build_filter_bank(4, 44100, SpacingMode::Linear, FilterFamily::Butterworth)
            .unwrap();
        let err = bank.apply(&[0.0; 16], 4).unwrap_err();
        assert!(matches!(
            err,
            AudioError::ChannelIndexOutOfRange { index: 4, count: 4 }
        ));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let err = build_filter_bank(0, 44100, SpacingMode::Linear, FilterFamily::Butterworth)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_biquad_bank_reads_order_as_q() {
        let bank = build_filter_bank(3, 16000, SpacingMode::Linear, FilterFamily::Biquad).unwrap();
        assert_eq!(bank.len(), 3);
        assert!(bank.specs().iter().all(|s| s.order == DEFAULT_FILTER_ORDER));
    }
}
