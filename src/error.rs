//! Error taxonomy for the analysis core.
//!
//! Two failure kinds exist: bad configuration (filter cutoffs, orders,
//! window sizes) and bad input data (length mismatches, unknown stage
//! labels, non-finite samples). A detector finding *no* events is not a
//! failure — it returns an empty span list.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid tunable parameters: cutoff outside (0, Nyquist), unknown
    /// band/method combination, zero filter order, empty window, ...
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid input data: signal/hypnogram length mismatch, stage label
    /// outside {-1..4}, NaN or infinite samples.
    #[error("invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

/// Reject non-finite samples up front so detectors never have to reason
/// about NaN ordering.
pub(crate) fn check_finite(x: &[f64]) -> Result<()> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::validation(format!(
            "non-finite sample at index {i}"
        ))),
        None => Ok(()),
    }
}

/// Sampling rates must be strictly positive.
pub(crate) fn check_sf(sf: f64) -> Result<()> {
    if sf > 0.0 && sf.is_finite() {
        Ok(())
    } else {
        Err(Error::config(format!("sampling rate must be > 0, got {sf}")))
    }
}
