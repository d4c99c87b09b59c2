//! Per-channel analysis and resynthesis.

use chanvoc_spec::SynthesisMode;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use tracing::{debug, warn};

use super::engine::ChannelVocoder;
use super::noise::inject_noise;
use crate::error::AudioResult;
use crate::loader::{SampleLoader, WavFileLoader};
use crate::oscillator::synthesize_carrier_with;
use crate::spectral::{Frame, Stft};

impl ChannelVocoder {
    /// Vocodes a modulator, loading sampled carriers from WAV files.
    pub fn vocode(&self, modulator: &[f64]) -> AudioResult<Vec<f64>> {
        self.vocode_with_loader(&WavFileLoader, modulator)
    }

    /// Vocodes a modulator, loading sampled carriers through `loader`.
    ///
    /// The output has exactly as many samples as the modulator.
    pub fn vocode_with_loader(
        &self,
        loader: &dyn SampleLoader,
        modulator: &[f64],
    ) -> AudioResult<Vec<f64>> {
        let config = &self.config;
        let num_samples = modulator.len();

        let mut carrier = synthesize_carrier_with(
            loader,
            &config.carrier.shape,
            &config.carrier.frequency,
            num_samples,
            config.sample_rate,
        )?;
        if let Some(noise) = &config.noise {
            inject_noise(&mut carrier, noise, config.sample_rate)?;
        }

        if num_samples == 0 {
            return Ok(Vec::new());
        }

        let mut output = match (&config.mode, &self.stft) {
            (SynthesisMode::Spectral(params), Some(stft)) => {
                self.spectral_channels(stft, params.balance, modulator, &carrier)?
            }
            _ => self.time_domain_channels(modulator, &carrier)?,
        };

        let peak = output.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
        if config.normalize && peak > 1.0 {
            warn!(peak, "vocoder output exceeds full scale, normalizing");
            output.iter_mut().for_each(|s| *s /= peak);
        }

        debug!(
            samples = num_samples,
            channels = self.bank.len(),
            formant_step = config.formant_step,
            spectral = self.stft.is_some(),
            peak,
            "vocoded"
        );

        Ok(output)
    }

    /// Sums modulator band times carrier band over all channels.
    fn time_domain_channels(&self, modulator: &[f64], carrier: &[f64]) -> AudioResult<Vec<f64>> {
        let bands = (0..self.bank.len())
            .into_par_iter()
            .map(|channel| -> AudioResult<Vec<f64>> {
                let m_band = self.bank.apply(modulator, channel)?;
                let c_band = self.bank.apply(carrier, self.carrier_channel(channel))?;
                Ok(m_band
                    .iter()
                    .zip(&c_band)
                    .map(|(m, c)| m * c)
                    .collect())
            })
            .collect::<AudioResult<Vec<_>>>()?;

        // Summed in channel order so the result does not depend on scheduling
        let mut output = vec![0.0; modulator.len()];
        for band in &bands {
            for (out, &s) in output.iter_mut().zip(band) {
                *out += s;
            }
        }
        Ok(output)
    }

    /// Scales each carrier band's STFT frames by the modulator band's frame
    /// RMS (raised to `balance`), sums the spectra and inverts the sum.
    fn spectral_channels(
        &self,
        stft: &Stft,
        balance: f64,
        modulator: &[f64],
        carrier: &[f64],
    ) -> AudioResult<Vec<f64>> {
        let channel_frames = (0..self.bank.len())
            .into_par_iter()
            .map(|channel| -> AudioResult<Vec<Frame>> {
                let m_band = self.bank.apply(modulator, channel)?;
                let c_band = self.bank.apply(carrier, self.carrier_channel(channel))?;

                let envelope = stft.frame_rms(&m_band);
                let frames: Vec<Frame> = stft
                    .analyze(&c_band)
                    .into_iter()
                    .zip(&envelope)
                    .map(|(frame, &rms)| {
                        let gain = rms.powf(balance);
                        frame.into_iter().map(|bin| bin * gain).collect()
                    })
                    .collect();
                Ok(frames)
            })
            .collect::<AudioResult<Vec<_>>>()?;

        let frame_count = stft.frame_count(modulator.len());
        let mut aggregate: Vec<Frame> =
            vec![vec![Complex64::new(0.0, 0.0); stft.frame_size()]; frame_count];
        for frames in &channel_frames {
            for (sum, frame) in aggregate.iter_mut().zip(frames) {
                for (acc, &bin) in sum.iter_mut().zip(frame) {
                    *acc += bin;
                }
            }
        }

        Ok(stft.synthesize(&aggregate, modulator.len()))
    }
}
