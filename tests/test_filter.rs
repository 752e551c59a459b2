//! Filtering contract: DC rejection, length preservation, stability,
//! validation.
use rand::prelude::*;
use somnoscan::{filt, Band, Cutoff, Error, Method, Way};

fn dc_signal(n: usize) -> Vec<f64> {
    vec![1.0; n]
}

fn all_cases() -> Vec<(Band, Cutoff)> {
    vec![
        (Band::Bandpass, Cutoff::Pair(2.0, 4.0)),
        (Band::Bandstop, Cutoff::Pair(2.0, 4.0)),
        (Band::Highpass, Cutoff::Single(3.0)),
        (Band::Lowpass, Cutoff::Single(3.0)),
    ]
}

#[test]
fn every_variant_preserves_length() {
    let x: Vec<f64> = (0..2000).map(|i| (i as f64 * 0.05).sin()).collect();
    for (band, cutoff) in all_cases() {
        for method in [Method::Butterworth, Method::Bessel] {
            for way in [Way::FiltFilt, Way::LFilter] {
                for order in [2, 3, 5] {
                    let y = filt(512.0, cutoff, &x, band, method, way, order)
                        .unwrap_or_else(|e| panic!("{band:?}/{method:?}/{way:?}/{order}: {e}"));
                    assert_eq!(y.len(), x.len());
                    assert!(
                        y.iter().all(|v| v.is_finite()),
                        "{band:?}/{method:?}/{way:?}/{order}: non-finite output"
                    );
                    let max = y.iter().fold(0.0f64, |a, &v| a.max(v.abs()));
                    assert!(
                        max < 100.0,
                        "{band:?}/{method:?}/{way:?}/{order}: |y| up to {max}"
                    );
                }
            }
        }
    }
}

#[test]
fn bandpass_and_highpass_reject_dc() {
    let x = dc_signal(4096);
    for (band, cutoff) in [
        (Band::Bandpass, Cutoff::Pair(2.0, 8.0)),
        (Band::Highpass, Cutoff::Single(1.0)),
    ] {
        let y = filt(256.0, cutoff, &x, band, Method::Butterworth, Way::FiltFilt, 3).unwrap();
        // Skip the edge transient, judge the interior.
        let interior = &y[512..3584];
        let max = interior.iter().fold(0.0f64, |a, &v| a.max(v.abs()));
        assert!(max < 1e-6, "{band:?} left DC of {max}");
    }
}

#[test]
fn lowpass_keeps_dc() {
    let x = dc_signal(2048);
    let y = filt(256.0, Cutoff::Single(10.0), &x, Band::Lowpass, Method::Butterworth, Way::FiltFilt, 4).unwrap();
    let mid = y[1024];
    assert!((mid - 1.0).abs() < 1e-6, "DC gain {mid}");
}

#[test]
fn bandstop_removes_the_notched_tone() {
    let sf = 256.0;
    let x: Vec<f64> = (0..8192)
        .map(|i| {
            let t = i as f64 / sf;
            (2.0 * std::f64::consts::PI * 50.0 * t).sin()
                + (2.0 * std::f64::consts::PI * 5.0 * t).sin()
        })
        .collect();
    let y = filt(sf, Cutoff::Pair(45.0, 55.0), &x, Band::Bandstop, Method::Butterworth, Way::FiltFilt, 3).unwrap();
    // The 5 Hz component survives, the 50 Hz component is gone.
    let interior = &y[2048..6144];
    let max = interior.iter().fold(0.0f64, |a, &v| a.max(v.abs()));
    assert!(max > 0.8 && max < 1.2, "5 Hz tone damaged: max {max}");
}

#[test]
fn high_order_narrow_band_filtfilt_is_stable() {
    // Order-5 bandpass over a 2 Hz band at 512 Hz puts every pole close
    // to z = 1; the output must stay bounded on broadband input and the
    // DC rejection must still hold.
    let sf = 512.0;
    let band = Cutoff::Pair(2.0, 4.0);
    let mut rng = StdRng::seed_from_u64(17);
    let x: Vec<f64> = (0..4096).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let y = filt(sf, band, &x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 5).unwrap();
    assert!(y.iter().all(|v| v.is_finite()));
    let max = y.iter().fold(0.0f64, |a, &v| a.max(v.abs()));
    assert!(max < 10.0, "narrow-band output grew to {max}");

    let dc = filt(sf, band, &vec![1.0; 4096], Band::Bandpass, Method::Butterworth, Way::FiltFilt, 5)
        .unwrap();
    // The poles sit close to the unit circle, so judge the slow edge
    // transient only well inside the record.
    let interior = &dc[1600..2496];
    let res = interior.iter().fold(0.0f64, |a, &v| a.max(v.abs()));
    assert!(res < 1e-6, "{res} of DC left by order-5 bandpass");
}

#[test]
fn nyquist_violation_is_config_error() {
    let x = dc_signal(512);
    let r = filt(100.0, Cutoff::Single(60.0), &x, Band::Lowpass, Method::Butterworth, Way::LFilter, 2);
    assert!(matches!(r, Err(Error::Config(_))));
}

#[test]
fn nonfinite_input_is_validation_error() {
    let mut x = dc_signal(512);
    x[100] = f64::INFINITY;
    let r = filt(100.0, Cutoff::Single(10.0), &x, Band::Lowpass, Method::Butterworth, Way::LFilter, 2);
    assert!(matches!(r, Err(Error::Validation(_))));
}
