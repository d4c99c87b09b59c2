//! Carrier sample loading.

use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::error::{AudioError, AudioResult};

/// Resampler chunk size in frames.
const RESAMPLE_CHUNK: usize = 1024;

/// Source of sampled carrier signals.
pub trait SampleLoader {
    /// Loads a mono signal at `target_sample_rate`, at most `max_samples` long.
    ///
    /// Fails with [`AudioError::ResourceNotFound`] when `path` does not exist.
    fn load(&self, path: &Path, target_sample_rate: u32, max_samples: usize)
        -> AudioResult<Vec<f64>>;
}

/// Loads WAV files from disk.
///
/// Multi-channel files are mixed down to mono by averaging channels and
/// resampled when the file rate differs from the target rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavFileLoader;

impl SampleLoader for WavFileLoader {
    fn load(
        &self,
        path: &Path,
        target_sample_rate: u32,
        max_samples: usize,
    ) -> AudioResult<Vec<f64>> {
        if !path.is_file() {
            return Err(AudioError::ResourceNotFound {
                path: path.to_path_buf(),
            });
        }

        // Read only what the output can use, plus a chunk of resampler context
        let max_seconds =
            max_samples.saturating_add(RESAMPLE_CHUNK) as f64 / target_sample_rate as f64;
        let (mut samples, file_rate) = read_wav_mono(path, max_seconds)?;

        if file_rate != target_sample_rate {
            debug!(
                path = %path.display(),
                from = file_rate,
                to = target_sample_rate,
                "resampling carrier sample"
            );
            samples = resample(&samples, file_rate, target_sample_rate)?;
        }

        samples.truncate(max_samples);
        Ok(samples)
    }
}

/// Reads a WAV file as mono `f64` samples in [-1, 1], with its sample rate.
///
/// Decoding stops after `max_seconds` of audio; pass `f64::INFINITY` to read
/// the whole file.
pub fn read_wav_mono(path: &Path, max_seconds: f64) -> AudioResult<(Vec<f64>, u32)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let limit = frames_within(max_seconds, spec.sample_rate)
        .saturating_mul(spec.channels.max(1) as usize);

    let mono = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            let samples = reader.samples::<f32>().take(limit).collect::<Result<Vec<_>, _>>()?;
            mix_to_mono(&samples, spec.channels, |s| s as f64)
        }
        (hound::SampleFormat::Int, 8) => {
            let samples = reader.samples::<i8>().take(limit).collect::<Result<Vec<_>, _>>()?;
            mix_to_mono(&samples, spec.channels, |s| normalize_int(s as i32, 8))
        }
        (hound::SampleFormat::Int, 16) => {
            let samples = reader.samples::<i16>().take(limit).collect::<Result<Vec<_>, _>>()?;
            mix_to_mono(&samples, spec.channels, |s| normalize_int(s as i32, 16))
        }
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let samples = reader.samples::<i32>().take(limit).collect::<Result<Vec<_>, _>>()?;
            mix_to_mono(&samples, spec.channels, |s| normalize_int(s, bits))
        }
        (format, bits) => {
            return Err(AudioError::invalid_param(
                "carrier.sample",
                format!(
                    "unsupported WAV format in '{}': {:?} at {} bits",
                    path.display(),
                    format,
                    bits
                ),
            ));
        }
    };

    Ok((mono, spec.sample_rate))
}

/// Whole frames covering `seconds` of audio at `sample_rate`.
fn frames_within(seconds: f64, sample_rate: u32) -> usize {
    if seconds.is_finite() {
        // Float to int casts saturate
        (seconds.max(0.0) * sample_rate as f64).ceil() as usize
    } else {
        usize::MAX
    }
}

/// Averages interleaved channels into one.
fn mix_to_mono<T: Copy>(samples: &[T], channels: u16, to_f64: impl Fn(T) -> f64) -> Vec<f64> {
    let channels = channels.max(1) as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|&s| to_f64(s)).sum::<f64>() / channels as f64)
        .collect()
}

/// Normalize an integer sample to [-1.0, 1.0] by its bit depth.
fn normalize_int(sample: i32, bits_per_sample: u16) -> f64 {
    let max_value = (1u64 << (bits_per_sample - 1)) as f64;
    sample as f64 / max_value
}

/// Sinc-resamples a mono signal.
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> AudioResult<Vec<f64>> {
    if samples.is_empty() || from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 32,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f64>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| AudioError::resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut output: Vec<f64> = Vec::with_capacity(expected + delay);

    let mut offset = 0;
    // Keep feeding zero-padded chunks until the delayed tail has come out
    while output.len() < expected + delay {
        let mut chunk = vec![0.0; RESAMPLE_CHUNK];
        if offset < samples.len() {
            let end = (offset + RESAMPLE_CHUNK).min(samples.len());
            chunk[..end - offset].copy_from_slice(&samples[offset..end]);
        }
        offset += RESAMPLE_CHUNK;

        let processed = resampler
            .process(&[chunk], None)
            .map_err(|e| AudioError::resample(e.to_string()))?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    Ok(output.into_iter().skip(delay).take(expected).collect())
}
