//! Band filtering of physiological signals.
//!
//! [`design`] builds Butterworth/Bessel IIR coefficients, [`lfilter`] and
//! [`filtfilt`] apply them, and [`filt`] does both in one call — the shape
//! every detector uses to extract its characteristic band.
pub mod apply;
pub mod design;

pub use apply::{filtfilt, lfilter};
pub use design::{design, Band, Cutoff, Iir, Method, Sos, Way};

use crate::error::{check_finite, Result};

/// Design and apply a filter in one step.
///
/// Validates the input signal (finite samples) and the configuration
/// (cutoffs against Nyquist, order), then returns the filtered signal with
/// the same length as `x`.
pub fn filt(
    sf: f64,
    cutoff: Cutoff,
    x: &[f64],
    band: Band,
    method: Method,
    way: Way,
    order: usize,
) -> Result<Vec<f64>> {
    check_finite(x)?;
    let iir = design(sf, cutoff, band, method, order)?;
    match way {
        Way::FiltFilt => filtfilt(&iir, x),
        Way::LFilter => lfilter(&iir, x),
    }
}
