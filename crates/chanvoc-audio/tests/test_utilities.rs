//! ADSR and dynamics integration tests.

use chanvoc_audio::{adsr_envelope, compress, expand, AdsrParams};

#[test]
fn test_default_adsr_two_seconds() {
    let params = AdsrParams::default();
    let env = adsr_envelope(
        88200,
        params.attack,
        params.decay,
        params.sustain,
        params.release,
        44100,
    )
    .unwrap();

    assert_eq!(env.len(), 88200);
    assert_eq!(env[0], 0.0);
    assert!((env[3527] - 1.0).abs() < 1e-12);

    // Attack rises, decay falls
    assert!(env[..3528].windows(2).all(|w| w[1] >= w[0]));
    assert!(env[3528..16758].windows(2).all(|w| w[1] <= w[0] + 1e-12));

    assert!(env[16758..70560].iter().all(|&v| v == 0.6));
    assert!(env[70560..].windows(2).all(|w| w[1] <= w[0] + 1e-12));
    assert!((env[88199] - 0.001).abs() < 1e-12);
}

#[test]
fn test_adsr_short_note_collapses() {
    // 0.3 s only fits attack and part of the release
    let env = adsr_envelope(13230, 0.08, 0.3, 0.6, 0.4, 44100).unwrap();
    assert_eq!(env.len(), 13230);
    assert!((env[3527] - 1.0).abs() < 1e-12);
    assert!(env[3528..].windows(2).all(|w| w[1] < w[0]));
    assert!(env[13229] > 0.001);
}

#[test]
fn test_compressor_then_expander_on_decaying_tone() {
    let signal: Vec<f64> = (0..2000)
        .map(|i| (i as f64 * 0.3).sin() * (-(i as f64) / 400.0).exp())
        .collect();

    let compressed = compress(&signal, -10.0, 4.0).unwrap();
    let expanded = expand(&signal, -10.0, 4.0).unwrap();
    assert_eq!(compressed.len(), signal.len());
    assert_eq!(expanded.len(), signal.len());

    // The quiet tail comes up under compression and goes down under expansion
    let tail = |s: &[f64]| s[1800..].iter().fold(0.0f64, |m, &x| m.max(x.abs()));
    assert!(tail(&compressed) > tail(&signal));
    assert!(tail(&expanded) < tail(&signal));
}
