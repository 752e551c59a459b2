//! Small time-domain helpers shared by the detectors.
//!
//! Moving-window smoothing, centered derivative, Teager–Kaiser energy,
//! zero crossings, range normalisation, detrend/demean.
use crate::error::{Error, Result};

/// Window shape for [`smoothing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Flat,
    Hanning,
    Hamming,
    Bartlett,
    Blackman,
}

impl Window {
    /// Coefficient `i` of an `n`-point window, unnormalised.
    fn coeff(self, i: usize, n: usize) -> f64 {
        use std::f64::consts::PI;
        if n == 1 {
            return 1.0;
        }
        let x = i as f64 / (n - 1) as f64;
        match self {
            Window::Flat => 1.0,
            Window::Hanning => 0.5 - 0.5 * (2.0 * PI * x).cos(),
            Window::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
            Window::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
            Window::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            }
        }
    }
}

/// Moving-window smoothing. Output has the same length as the input.
///
/// The signal is extended by edge reflection before convolving with the
/// normalised window, so the ends are not pulled toward zero.
/// `n_window` is clamped to the signal length; a window of 1 (or a signal
/// shorter than 3 samples) returns the input unchanged.
pub fn smoothing(x: &[f64], n_window: usize, window: Window) -> Vec<f64> {
    let n = x.len();
    let m = n_window.clamp(1, n.max(1));
    if m <= 1 || n < 3 {
        return x.to_vec();
    }

    let w: Vec<f64> = (0..m).map(|i| window.coeff(i, m)).collect();
    let w_sum: f64 = w.iter().sum();

    // Reflect-extend by m samples on each side.
    let mut ext = Vec::with_capacity(n + 2 * m);
    for i in (1..=m.min(n - 1)).rev() {
        ext.push(x[i]);
    }
    while ext.len() < m {
        ext.insert(0, x[0]);
    }
    ext.extend_from_slice(x);
    for i in 1..=m.min(n - 1) {
        ext.push(x[n - 1 - i]);
    }
    while ext.len() < n + 2 * m {
        ext.push(x[n - 1]);
    }

    let half = m / 2;
    (0..n)
        .map(|i| {
            let start = i + m - half;
            let acc: f64 = (0..m).map(|j| ext[start + j] * w[j]).sum();
            acc / w_sum
        })
        .collect()
}

/// Absolute centered derivative over a `window_s`-second window.
///
/// `d[i] = |x[i + w/2] - x[i - w/2]|`, with the border left at zero.
/// Used on EOG channels where rapid eye movements show up as steep slopes.
pub fn derivative(x: &[f64], window_s: f64, sf: f64) -> Result<Vec<f64>> {
    let n = x.len();
    let step = ((window_s * sf / 2.0).round() as usize).max(1);
    if 2 * step >= n {
        return Err(Error::config(format!(
            "derivative window ({window_s} s at {sf} Hz) longer than signal"
        )));
    }
    let mut out = vec![0.0; n];
    for i in step..n - step {
        out[i] = (x[i + step] - x[i - step]).abs();
    }
    Ok(out)
}

/// Teager–Kaiser energy operator: `x[n]^2 - x[n-1] * x[n+1]`.
///
/// Emphasises both amplitude and frequency of transients, which makes it a
/// good front end for EMG artifact detection. First and last samples are
/// copied from their neighbours so the output keeps the input length.
pub fn tkeo(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 3 {
        return vec![0.0; n];
    }
    let mut out = vec![0.0; n];
    for i in 1..n - 1 {
        out[i] = x[i] * x[i] - x[i - 1] * x[i + 1];
    }
    out[0] = out[1];
    out[n - 1] = out[n - 2];
    out
}

/// Indices where the signal changes sign (first index of the new sign).
pub fn zerocrossing(x: &[f64]) -> Vec<usize> {
    x.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] * w[1] < 0.0)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Affine rescale of `x` into `[lo, hi]`. A constant signal maps to `lo`.
pub fn normalize_range(x: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let (min, max) = x.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| {
        (a.min(v), b.max(v))
    });
    let ptp = max - min;
    if !(ptp > 0.0) {
        return vec![lo; x.len()];
    }
    x.iter().map(|&v| lo + (hi - lo) * (v - min) / ptp).collect()
}

/// Remove the least-squares linear trend.
pub fn detrend(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return x.to_vec();
    }
    let nf = n as f64;
    let t_mean = (nf - 1.0) / 2.0;
    let x_mean = x.iter().sum::<f64>() / nf;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &v) in x.iter().enumerate() {
        let dt = i as f64 - t_mean;
        num += dt * (v - x_mean);
        den += dt * dt;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    x.iter()
        .enumerate()
        .map(|(i, &v)| v - (x_mean + slope * (i as f64 - t_mean)))
        .collect()
}

/// Subtract the mean.
pub fn demean(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return vec![];
    }
    let m = x.iter().sum::<f64>() / x.len() as f64;
    x.iter().map(|&v| v - m).collect()
}

/// Mean and population standard deviation in one pass.
pub(crate) fn mean_std(x: &[f64]) -> (f64, f64) {
    if x.is_empty() {
        return (0.0, 0.0);
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let var = x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
