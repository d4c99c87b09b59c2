//! Channel vocoder.
//!
//! The vocoder imposes the band-wise envelope of a modulator on a carrier:
//! 1. Synthesize a carrier as long as the modulator, optionally mixed with
//!    filtered noise
//! 2. Split modulator and carrier through the same filter bank
//! 3. Combine each modulator band with a carrier band, either by direct
//!    multiplication or by scaling the carrier band's short-time spectrum
//!    with the modulator band's frame RMS
//! 4. Sum the channels (and invert the summed spectrum in spectral mode)
//!
//! The formant step reads the carrier from a band shifted by a fixed number
//! of channels, wrapping around the bank.

mod engine;
mod noise;
mod processor;


pub use engine::{vocode, ChannelVocoder};
pub use noise::inject_noise;
