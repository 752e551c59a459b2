//! IIR filter application: causal `lfilter` and zero-phase `filtfilt`.
//!
//! Filters are applied section by section: each biquad is a direct-form-II
//! transposed recursion, run over the output of the previous one.
//! `filtfilt` runs the whole cascade forward then backward over an
//! odd-reflection-padded copy of the signal, which cancels the phase
//! response and suppresses the edge transient.
use crate::error::{Error, Result};
use crate::filter::design::{Iir, Sos};

/// Causal IIR filtering, one DF2T pass per second-order section.
///
/// Returns a vector of the same length as `x`.
pub fn lfilter(iir: &Iir, x: &[f64]) -> Result<Vec<f64>> {
    if iir.sos.is_empty() {
        return Err(Error::config("filter has no sections"));
    }
    let mut y = x.to_vec();
    for s in &iir.sos {
        biquad(s, &mut y)?;
    }
    Ok(y)
}

fn biquad(s: &Sos, y: &mut [f64]) -> Result<()> {
    let a0 = s.a[0];
    if a0 == 0.0 {
        return Err(Error::config("a[0] must be non-zero"));
    }
    let (b0, b1, b2) = (s.b[0] / a0, s.b[1] / a0, s.b[2] / a0);
    let (a1, a2) = (s.a[1] / a0, s.a[2] / a0);
    let (mut z1, mut z2) = (0.0f64, 0.0f64);
    for v in y.iter_mut() {
        let xi = *v;
        let yi = b0 * xi + z1;
        z1 = b1 * xi + z2 - a1 * yi;
        z2 = b2 * xi - a2 * yi;
        *v = yi;
    }
    Ok(())
}

/// Zero-phase filtering: forward pass, reverse, forward pass, reverse.
///
/// The input is extended on both sides by an odd reflection of
/// `3 · (n_taps − 1)` samples (clamped to the signal length, with
/// `n_taps = 2 · sections + 1`) before filtering, then the extension is
/// stripped. Signals shorter than four samples are rejected.
pub fn filtfilt(iir: &Iir, x: &[f64]) -> Result<Vec<f64>> {
    let n = x.len();
    if n < 4 {
        return Err(Error::validation(format!(
            "filtfilt needs at least 4 samples, got {n}"
        )));
    }
    let n_taps = 2 * iir.sos.len() + 1;
    let pad = (3 * (n_taps.max(2) - 1)).min(n - 1);

    // Odd reflection: ext[i] = 2·x[edge] − x[mirror].
    let mut ext = Vec::with_capacity(n + 2 * pad);
    for i in (1..=pad).rev() {
        ext.push(2.0 * x[0] - x[i]);
    }
    ext.extend_from_slice(x);
    for i in 1..=pad {
        ext.push(2.0 * x[n - 1] - x[n - 1 - i]);
    }

    let mut y = lfilter(iir, &ext)?;
    y.reverse();
    let mut y = lfilter(iir, &y)?;
    y.reverse();

    Ok(y[pad..pad + n].to_vec())
}
