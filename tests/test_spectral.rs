//! Spectral engine contract: normalization and frequency selectivity.
use rand::prelude::*;
use somnoscan::{morlet_power, ndmorlet, welch_power, WaveletView};

fn noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

#[test]
fn morlet_power_normalized_columns_sum_to_one() {
    let x = noise(2000, 3);
    let freqs = [1.0, 2.0, 3.0, 4.0];
    let p = morlet_power(&x, &freqs, 512.0, true).unwrap();
    let max_sum = p
        .columns()
        .into_iter()
        .map(|c| c.sum())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((max_sum - 1.0).abs() < 1e-9, "max column sum {max_sum}");
}

#[test]
fn morlet_power_unnormalized_exceeds_one_for_strong_signal() {
    let sf = 512.0;
    let x: Vec<f64> = (0..4000)
        .map(|i| 5.0 * (2.0 * std::f64::consts::PI * 3.0 * i as f64 / sf).sin())
        .collect();
    let p = morlet_power(&x, &[1.0, 2.0, 3.0, 4.0], sf, false).unwrap();
    let max_sum = p
        .columns()
        .into_iter()
        .map(|c| c.sum())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(max_sum > 1.0, "unnormalized max column sum {max_sum}");
}

#[test]
fn welch_power_normalized_columns_sum_to_one() {
    let x = noise(4096, 5);
    let p = welch_power(&x, &[5.0, 10.0, 15.0], 512.0, true).unwrap();
    let max_sum = p
        .columns()
        .into_iter()
        .map(|c| c.sum())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((max_sum - 1.0).abs() < 1e-9, "max column sum {max_sum}");
}

#[test]
fn wavelet_views_are_consistent() {
    let sf = 256.0;
    let x: Vec<f64> = (0..2048)
        .map(|i| (2.0 * std::f64::consts::PI * 9.0 * i as f64 / sf).sin())
        .collect();
    let amp = ndmorlet(&x, sf, 9.0, Some(WaveletView::Amplitude)).unwrap();
    let pow = ndmorlet(&x, sf, 9.0, Some(WaveletView::Power)).unwrap();
    let phase = ndmorlet(&x, sf, 9.0, Some(WaveletView::Phase)).unwrap();
    for i in 0..x.len() {
        assert!((pow[i] - amp[i] * amp[i]).abs() < 1e-9);
        assert!(phase[i] >= -std::f64::consts::PI && phase[i] <= std::f64::consts::PI);
        assert!(amp[i] >= 0.0);
    }
}
