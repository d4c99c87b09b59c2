//! Short-time Fourier transform with centered framing.
//!
//! Signals are zero-padded by half a frame on both sides, so frame `t` is
//! centered on sample `t * hop` and a signal of `n` samples has
//! `1 + n / hop` frames. The inverse overlap-adds windowed frames and
//! divides by the summed squared window.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::{AudioError, AudioResult};

/// Spectrum of one analysis frame (full length, not one-sided).
pub type Frame = Vec<Complex64>;

/// Computes the periodic Hann window value at a given index.
#[inline]
pub fn hann_window(i: usize, size: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos())
}

/// Forward and inverse STFT for a fixed frame and hop size.
#[derive(Clone)]
pub struct Stft {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Stft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stft")
            .field("frame_size", &self.frame_size)
            .field("hop_size", &self.hop_size)
            .finish()
    }
}

impl Stft {
    /// Plans transforms for the given frame and hop size.
    ///
    /// # Arguments
    /// * `frame_size` - Frame length in samples (>= 2)
    /// * `hop_size` - Hop in samples, in [1, frame_size / 2]
    pub fn new(frame_size: usize, hop_size: usize) -> AudioResult<Self> {
        if frame_size < 2 {
            return Err(AudioError::invalid_param(
                "stft.frame_size",
                format!("must be at least 2, got {}", frame_size),
            ));
        }
        if hop_size == 0 || hop_size > frame_size / 2 {
            return Err(AudioError::invalid_param(
                "stft.hop_size",
                format!(
                    "must be in [1, {}], got {}",
                    frame_size / 2,
                    hop_size
                ),
            ));
        }

        let mut planner = FftPlanner::<f64>::new();
        Ok(Self {
            frame_size,
            hop_size,
            window: (0..frame_size).map(|i| hann_window(i, frame_size)).collect(),
            forward: planner.plan_fft_forward(frame_size),
            inverse: planner.plan_fft_inverse(frame_size),
        })
    }

    /// Frame length in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hop in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of frames for a signal of `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_size
    }

    /// Copies frame `t` out of the signal, with zeros outside its bounds.
    fn frame(&self, signal: &[f64], t: usize) -> Vec<f64> {
        let pad = self.frame_size / 2;
        let start = (t * self.hop_size) as isize - pad as isize;
        (0..self.frame_size)
            .map(|i| {
                let idx = start + i as isize;
                if idx >= 0 && (idx as usize) < signal.len() {
                    signal[idx as usize]
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Windowed spectra of every frame.
    pub fn analyze(&self, signal: &[f64]) -> Vec<Frame> {
        (0..self.frame_count(signal.len()))
            .map(|t| {
                let mut buffer: Frame = self
                    .frame(signal, t)
                    .iter()
                    .zip(&self.window)
                    .map(|(&s, &w)| Complex64::new(s * w, 0.0))
                    .collect();
                self.forward.process(&mut buffer);
                buffer
            })
            .collect()
    }

    /// Overlap-adds frames back into a signal of exactly `len` samples.
    pub fn synthesize(&self, frames: &[Frame], len: usize) -> Vec<f64> {
        let pad = self.frame_size / 2;
        let total = self.frame_size + self.hop_size * frames.len().saturating_sub(1);
        let mut output = vec![0.0; total];
        let mut window_sum = vec![0.0; total];
        let scale = 1.0 / self.frame_size as f64;

        for (t, spectrum) in frames.iter().enumerate() {
            let mut buffer = spectrum.clone();
            self.inverse.process(&mut buffer);

            let offset = t * self.hop_size;
            for (i, (sample, &w)) in buffer.iter().zip(&self.window).enumerate() {
                output[offset + i] += sample.re * scale * w;
                window_sum[offset + i] += w * w;
            }
        }

        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            if sum > 1e-10 {
                *sample /= sum;
            }
        }

        let mut trimmed: Vec<f64> = output.into_iter().skip(pad).take(len).collect();
        trimmed.resize(len, 0.0);
        trimmed
    }

    /// Root-mean-square of every (unwindowed) frame.
    pub fn frame_rms(&self, signal: &[f64]) -> Vec<f64> {
        (0..self.frame_count(signal.len()))
            .map(|t| {
                let frame = self.frame(signal, t);
                (frame.iter().map(|s| s * s).sum::<f64>() / self.frame_size as f64).sqrt()
            })
            .collect()
    }
}

/// Frame RMS with centered framing.
pub fn frame_rms(signal: &[f64], frame_size: usize, hop_size: usize) -> AudioResult<Vec<f64>> {
    Ok(Stft::new(frame_size, hop_size)?.frame_rms(signal))
}
