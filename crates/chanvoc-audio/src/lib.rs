//! chanvoc Audio Backend
//!
//! This crate implements the DSP behind chanvoc: a channel vocoder that
//! imposes the band envelopes of a modulator signal on a synthetic or
//! sampled carrier.
//!
//! # Overview
//!
//! A [`VocoderConfig`](chanvoc_spec::VocoderConfig) describes the job. The
//! backend builds a [`FilterBank`] of band-pass filters from it, renders the
//! carrier, and transfers the envelope channel by channel:
//!
//! - **Time domain** - each modulator band is multiplied by its carrier band
//! - **Spectral** - each carrier band's STFT frames are scaled by the
//!   modulator band's frame RMS
//!
//! Channels are processed in parallel with rayon and summed in channel order.
//!
//! Two independent utilities ship alongside: an ADSR envelope generator and a
//! static compressor/expander.
//!
//! # Determinism
//!
//! Output is deterministic. Injected carrier noise uses PCG32 seeded via
//! BLAKE3 from the config's noise seed.
//!
//! # Example
//!
//! ```ignore
//! use chanvoc_audio::vocode;
//! use chanvoc_spec::{CarrierSpec, VocoderConfig};
//!
//! let config = VocoderConfig::new(16, 44100, CarrierSpec::sawtooth(110.0));
//! let output = vocode(&modulator, &config)?;
//! assert_eq!(output.len(), modulator.len());
//! ```
//!
//! # Crate Structure
//!
//! - [`vocoder`] - Channel vocoder engine
//! - [`filter_bank`] - Linear and mel-spaced band-pass filter banks
//! - [`filter`] - Biquads, second-order-section cascades and IIR design
//! - [`oscillator`] - Carrier oscillators
//! - [`loader`] - WAV loading for sampled carriers
//! - [`spectral`] - Short-time Fourier transform
//! - [`envelope`] - ADSR envelope generator
//! - [`dynamics`] - Compressor and expander
//! - [`rng`] - Deterministic RNG with seed derivation

pub mod dynamics;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod filter_bank;
pub mod loader;
pub mod oscillator;
pub mod rng;
pub mod spectral;
pub mod vocoder;

// Re-export main types at crate root
pub use dynamics::{compress, expand};
pub use envelope::{adsr_envelope, AdsrParams, EnvelopeSegments};
pub use error::{AudioError, AudioResult};
pub use filter::{BandpassFilter, BiquadCoeffs, BiquadFilter, SosFilter};
pub use filter_bank::{build_filter_bank, FilterBank};
pub use loader::{SampleLoader, WavFileLoader};
pub use oscillator::{synthesize_carrier, synthesize_carrier_with, PhaseAccumulator};
pub use spectral::Stft;
pub use vocoder::{inject_noise, vocode, ChannelVocoder};
