//! Time-frequency transforms: Morlet wavelet and Welch power.
//!
//! The Morlet transform is a "same"-length FFT convolution with a complex
//! Gaussian-windowed exponential (7 cycles wide). Its envelope is scaled to
//! sum to 2, so the amplitude view of a unit sine at the center frequency
//! reads ≈ 1.
use ndarray::Array2;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{check_finite, check_sf, Error, Result};

/// Cycles in the Morlet mother wavelet. Wider → better frequency
/// resolution, worse time resolution.
const MORLET_WIDTH: f64 = 7.0;

/// Real-valued view of a complex wavelet transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveletView {
    Amplitude,
    Phase,
    Power,
}

/// Complex Morlet wavelet transform of `x` at center frequency `f` Hz.
///
/// Output has the same length as the input.
pub fn morlet(x: &[f64], sf: f64, f: f64) -> Result<Vec<Complex64>> {
    check_sf(sf)?;
    check_finite(x)?;
    if !(f > 0.0 && f < sf / 2.0) {
        return Err(Error::config(format!(
            "wavelet frequency {f} Hz outside (0, {})",
            sf / 2.0
        )));
    }
    if x.is_empty() {
        return Ok(vec![]);
    }

    let kernel = morlet_kernel(sf, f);
    Ok(conv_same(x, &kernel))
}

/// Morlet transform reduced to a real-valued view (or kept complex with
/// `view = None`, in which case amplitude of the raw transform is *not*
/// taken — the caller gets the real part).
pub fn ndmorlet(x: &[f64], sf: f64, f: f64, view: Option<WaveletView>) -> Result<Vec<f64>> {
    let w = morlet(x, sf, f)?;
    Ok(match view {
        None => w.iter().map(|c| c.re).collect(),
        Some(WaveletView::Amplitude) => w.iter().map(|c| c.norm()).collect(),
        Some(WaveletView::Phase) => w.iter().map(|c| c.arg()).collect(),
        Some(WaveletView::Power) => w.iter().map(|c| c.norm_sqr()).collect(),
    })
}

/// Per-frequency Morlet power map, shape `(freqs.len(), x.len())`.
///
/// With `norm = true` each time column is divided by its sum, yielding a
/// relative spectral profile that sums to 1 across frequencies.
pub fn morlet_power(x: &[f64], freqs: &[f64], sf: f64, norm: bool) -> Result<Array2<f64>> {
    if freqs.is_empty() {
        return Err(Error::config("morlet_power needs at least one frequency"));
    }
    let mut out = Array2::<f64>::zeros((freqs.len(), x.len()));
    for (i, &f) in freqs.iter().enumerate() {
        let p = ndmorlet(x, sf, f, Some(WaveletView::Power))?;
        out.row_mut(i).assign(&ndarray::ArrayView1::from(&p));
    }
    if norm {
        normalize_columns(&mut out);
    }
    Ok(out)
}

/// Welch power evaluated at `freqs`, shape `(freqs.len(), n_windows)`.
///
/// Hann-windowed periodograms over 50 %-overlapping segments (segment
/// length ≈ 2 s, clamped to the signal); the PSD is linearly interpolated
/// at the requested frequencies. Same normalization contract as
/// [`morlet_power`].
pub fn welch_power(x: &[f64], freqs: &[f64], sf: f64, norm: bool) -> Result<Array2<f64>> {
    check_sf(sf)?;
    check_finite(x)?;
    if freqs.is_empty() {
        return Err(Error::config("welch_power needs at least one frequency"));
    }
    let nyq = sf / 2.0;
    for &f in freqs {
        if !(f >= 0.0 && f <= nyq) {
            return Err(Error::config(format!("PSD frequency {f} Hz outside [0, {nyq}]")));
        }
    }
    let n = x.len();
    let nperseg = ((2.0 * sf) as usize).clamp(8, n.max(8));
    if n < nperseg {
        return Err(Error::validation(format!(
            "signal too short for Welch estimate ({n} < {nperseg} samples)"
        )));
    }
    let hop = (nperseg / 2).max(1);
    let n_windows = (n - nperseg) / hop + 1;

    let window: Vec<f64> = hann(nperseg);
    let win_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sf * win_power);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);
    let df = sf / nperseg as f64;

    let mut out = Array2::<f64>::zeros((freqs.len(), n_windows));
    let mut buf = vec![Complex64::new(0.0, 0.0); nperseg];
    for w_idx in 0..n_windows {
        let start = w_idx * hop;
        let seg = &x[start..start + nperseg];
        let mean = seg.iter().sum::<f64>() / nperseg as f64;
        for (b, (&v, &w)) in buf.iter_mut().zip(seg.iter().zip(window.iter())) {
            *b = Complex64::new((v - mean) * w, 0.0);
        }
        fft.process(&mut buf);

        // One-sided PSD (doubled except DC and Nyquist).
        let n_bins = nperseg / 2 + 1;
        let psd_at = |bin: usize| -> f64 {
            let mut p = buf[bin].norm_sqr() * scale;
            if bin != 0 && !(nperseg % 2 == 0 && bin == n_bins - 1) {
                p *= 2.0;
            }
            p
        };

        for (f_idx, &f) in freqs.iter().enumerate() {
            let pos = f / df;
            let lo = (pos.floor() as usize).min(n_bins - 1);
            let hi = (lo + 1).min(n_bins - 1);
            let frac = pos - lo as f64;
            out[(f_idx, w_idx)] = psd_at(lo) * (1.0 - frac) + psd_at(hi) * frac;
        }
    }
    if norm {
        normalize_columns(&mut out);
    }
    Ok(out)
}

// ── internals ───────────────────────────────────────────────────────────────

/// Gaussian-windowed complex exponential, envelope summing to 2.
fn morlet_kernel(sf: f64, f: f64) -> Vec<Complex64> {
    use std::f64::consts::PI;
    let sigma_t = MORLET_WIDTH / (2.0 * PI * f);
    let half = (4.0 * sigma_t * sf).ceil() as i64;
    let mut env_sum = 0.0;
    let mut kernel: Vec<Complex64> = (-half..=half)
        .map(|i| {
            let t = i as f64 / sf;
            let env = (-t * t / (2.0 * sigma_t * sigma_t)).exp();
            env_sum += env;
            Complex64::from_polar(env, 2.0 * PI * f * t)
        })
        .collect();
    let scale = 2.0 / env_sum;
    for k in &mut kernel {
        *k *= scale;
    }
    kernel
}

/// "Same"-length complex FFT convolution of a real signal with a kernel.
fn conv_same(x: &[f64], kernel: &[Complex64]) -> Vec<Complex64> {
    let n = x.len();
    let m = kernel.len();
    let full = n + m - 1;
    let n_fft = full.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fwd = planner.plan_fft_forward(n_fft);
    let inv = planner.plan_fft_inverse(n_fft);

    let mut xf: Vec<Complex64> = x
        .iter()
        .map(|&v| Complex64::new(v, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(n_fft)
        .collect();
    let mut kf: Vec<Complex64> = kernel
        .iter()
        .copied()
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(n_fft)
        .collect();
    fwd.process(&mut xf);
    fwd.process(&mut kf);
    for (a, b) in xf.iter_mut().zip(kf.iter()) {
        *a *= b;
    }
    inv.process(&mut xf);

    let inv_scale = 1.0 / n_fft as f64;
    let offset = (m - 1) / 2;
    xf[offset..offset + n].iter().map(|c| c * inv_scale).collect()
}

fn hann(n: usize) -> Vec<f64> {
    use std::f64::consts::PI;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

fn normalize_columns(m: &mut Array2<f64>) {
    for mut col in m.columns_mut() {
        let s: f64 = col.iter().sum();
        if s > 0.0 {
            col.mapv_inplace(|v| v / s);
        }
    }
}
