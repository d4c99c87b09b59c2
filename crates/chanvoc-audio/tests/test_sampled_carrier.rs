//! Sampled carrier integration tests.

use std::path::Path;

use chanvoc_audio::{synthesize_carrier, vocode, AudioError};
use chanvoc_spec::{CarrierSpec, FrequencySpec, OscillatorShape, VocoderConfig};

fn write_saw(path: &Path, sample_rate: u32, len: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..len {
        let phase = (i % 100) as f64 / 50.0 - 1.0;
        writer.write_sample((phase * 16000.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_named_sample_carrier_resolves_and_resamples() {
    let dir = tempfile::tempdir().unwrap();
    write_saw(&dir.path().join("choir.wav"), 22050, 22050);

    let carrier = CarrierSpec::from_name("choir", &[], dir.path()).unwrap();
    let samples = synthesize_carrier(&carrier.shape, &carrier.frequency, 30000, 44100).unwrap();

    // One second at 22050 Hz is one second at 44100 Hz, then padded
    assert_eq!(samples.len(), 30000);
    assert!(samples[..22050].iter().any(|&s| s.abs() > 0.1));
    assert!(samples.iter().all(|s| s.is_finite()));
}

#[test]
fn test_sample_padded_with_silence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.wav");
    write_saw(&path, 44100, 1000);

    let shape = OscillatorShape::Sampled { path };
    let samples = synthesize_carrier(&shape, &FrequencySpec::default(), 5000, 44100).unwrap();

    assert_eq!(samples.len(), 5000);
    assert!(samples[1000..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_vocode_with_sampled_carrier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carrier.wav");
    write_saw(&path, 44100, 8820);

    let config = VocoderConfig::new(8, 44100, CarrierSpec::sampled(&path));
    let modulator: Vec<f64> = (0..8820)
        .map(|i| (i as f64 * 0.05).sin() * 0.5)
        .collect();

    let out = vocode(&modulator, &config).unwrap();
    assert_eq!(out.len(), 8820);
}

#[test]
fn test_missing_sample_is_resource_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let carrier = CarrierSpec::from_name("not_recorded", &[], dir.path()).unwrap();
    let config = VocoderConfig::new(4, 44100, carrier);

    let err = vocode(&[0.0; 128], &config).unwrap_err();
    match err {
        AudioError::ResourceNotFound { path } => {
            assert_eq!(path, dir.path().join("not_recorded.wav"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
