//! Vocoder engine construction.

use chanvoc_spec::{SynthesisMode, VocoderConfig};
use tracing::warn;

use crate::error::AudioResult;
use crate::filter_bank::FilterBank;
use crate::spectral::Stft;

/// A channel vocoder built from a validated config.
///
/// The filter bank (and the STFT plan in spectral mode) is built once and
/// reused for every call to [`ChannelVocoder::vocode`]. Changing the config
/// means building a new vocoder.
#[derive(Debug, Clone)]
pub struct ChannelVocoder {
    pub(super) config: VocoderConfig,
    pub(super) bank: FilterBank,
    pub(super) stft: Option<Stft>,
}

impl ChannelVocoder {
    /// Validates the config and builds the filter bank.
    ///
    /// Validation warnings are logged, not returned.
    pub fn new(config: VocoderConfig) -> AudioResult<Self> {
        let warnings = config.validate().into_result()?;
        for warning in &warnings {
            warn!(
                code = warning.code.code(),
                path = warning.path.as_deref().unwrap_or(""),
                "{}",
                warning.message
            );
        }

        let bank = FilterBank::new(
            config.channel_count,
            config.sample_rate,
            config.spacing,
            config.filter_family,
            config.filter_order,
        )?;

        let stft = match &config.mode {
            SynthesisMode::TimeDomain => None,
            SynthesisMode::Spectral(params) => Some(Stft::new(params.frame_size, params.hop_size)?),
        };

        Ok(Self { config, bank, stft })
    }

    /// The config this vocoder was built from.
    pub fn config(&self) -> &VocoderConfig {
        &self.config
    }

    /// The shared filter bank.
    pub fn filter_bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Carrier channel read for modulator channel `channel`.
    pub fn carrier_channel(&self, channel: usize) -> usize {
        let n = self.bank.len() as i64;
        (channel as i64 + self.config.formant_step as i64).rem_euclid(n) as usize
    }

    /// Carrier channel for every modulator channel, in order.
    pub fn channel_map(&self) -> Vec<usize> {
        (0..self.bank.len())
            .map(|i| self.carrier_channel(i))
            .collect()
    }
}

/// Vocodes a modulator with a one-off vocoder built from `config`.
///
/// # Arguments
/// * `modulator` - Modulator samples at `config.sample_rate`
/// * `config` - Vocoder config
///
/// # Returns
/// Output samples, as many as the modulator has
pub fn vocode(modulator: &[f64], config: &VocoderConfig) -> AudioResult<Vec<f64>> {
    ChannelVocoder::new(config.clone())?.vocode(modulator)
}
