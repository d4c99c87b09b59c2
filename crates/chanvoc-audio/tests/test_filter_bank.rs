//! Filter bank layout integration tests.

use chanvoc_audio::filter_bank::{build_filter_bank, FilterBank};
use chanvoc_spec::{FilterFamily, SpacingMode, MAX_FILTER_ORDER};

fn assert_tiles(bank: &FilterBank, channels: usize, nyquist: f64) {
    let specs = bank.specs();
    assert_eq!(specs.len(), channels);

    // Zero and Nyquist edges are pulled inside by one hertz
    assert_eq!(specs[0].low, 1.0);
    assert!((specs[channels - 1].high - (nyquist - 1.0)).abs() < 1e-6);

    for pair in specs.windows(2) {
        assert!(pair[0].low < pair[0].high);
        assert!((pair[0].high - pair[1].low).abs() < 1e-9);
    }
}

#[test]
fn test_linear_bank_tiles_band() {
    for channels in [1, 4, 8, 13] {
        let bank =
            build_filter_bank(channels, 44100, SpacingMode::Linear, FilterFamily::Butterworth)
                .unwrap();
        assert_tiles(&bank, channels, 22050.0);
    }
}

#[test]
fn test_mel_bank_tiles_band() {
    for channels in [1, 4, 8, 13] {
        let bank = build_filter_bank(channels, 44100, SpacingMode::Mel, FilterFamily::Butterworth)
            .unwrap();
        assert_tiles(&bank, channels, 22050.0);
    }
}

#[test]
fn test_every_family_builds() {
    for family in [
        FilterFamily::Butterworth,
        FilterFamily::Chebyshev1,
        FilterFamily::Bessel,
        FilterFamily::Biquad,
    ] {
        for spacing in [SpacingMode::Linear, SpacingMode::Mel] {
            let bank = build_filter_bank(8, 22050, spacing, family).unwrap();
            assert_eq!(bank.len(), 8);

            let out = bank.apply(&vec![0.0; 64], 7).unwrap();
            assert_eq!(out, vec![0.0; 64]);
        }
    }
}

#[test]
fn test_butterworth_channels_pass_their_band() {
    let bank =
        build_filter_bank(8, 44100, SpacingMode::Linear, FilterFamily::Butterworth).unwrap();

    for ch in 0..bank.len() {
        let filter = bank.filter(ch).unwrap();
        let center = filter.spec().center();
        assert!(filter.magnitude_at_hz(center) > 0.7, "channel {ch}");

        if ch + 1 < bank.len() {
            let next_center = bank.filter(ch + 1).unwrap().spec().center();
            assert!(
                filter.magnitude_at_hz(next_center) < 0.5,
                "channel {ch} leaks into {}",
                ch + 1
            );
        }
    }
}

#[test]
fn test_highest_order_impulse_response_decays() {
    // A stable band-pass with unit peak gain cannot ring above 1
    let mut impulse = vec![0.0; 44100];
    impulse[0] = 1.0;

    for family in [
        FilterFamily::Butterworth,
        FilterFamily::Chebyshev1,
        FilterFamily::Bessel,
    ] {
        for spacing in [SpacingMode::Linear, SpacingMode::Mel] {
            let bank = FilterBank::new(16, 44100, spacing, family, MAX_FILTER_ORDER).unwrap();
            for ch in 0..bank.len() {
                let response = bank.apply(&impulse, ch).unwrap();
                let peak = response.iter().fold(0.0f64, |m, &h| m.max(h.abs()));
                let tail = response[40000..].iter().fold(0.0f64, |m, &h| m.max(h.abs()));

                assert!(peak <= 1.0, "{family:?} {spacing:?} channel {ch}: peak {peak}");
                assert!(tail < 1e-3, "{family:?} {spacing:?} channel {ch}: tail {tail}");
            }
        }
    }
}
