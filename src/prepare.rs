//! Shared data-preparation step.
//!
//! Every detector (and the display layer above the crate) obtains its
//! working signal through the same fixed sequence: optional detrend →
//! optional demean → optional band filter → optional wavelet-derived view.
//! The configuration is an explicit immutable struct, validated once at
//! entry.
use crate::error::{check_finite, check_sf, Result};
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::sigproc::{demean, detrend};
use crate::spectral::{ndmorlet, WaveletView};

/// Band-filter step of the preparation sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiltSpec {
    pub cutoff: Cutoff,
    pub band: Band,
    pub method: Method,
    pub way: Way,
    pub order: usize,
}

impl Default for FiltSpec {
    fn default() -> Self {
        FiltSpec {
            cutoff: Cutoff::Pair(12.0, 16.0),
            band: Band::Bandpass,
            method: Method::Butterworth,
            way: Way::FiltFilt,
            order: 3,
        }
    }
}

/// Final view of the prepared signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayAs {
    /// The (possibly filtered) time series itself.
    #[default]
    Filtered,
    /// Morlet amplitude envelope at the band center.
    Amplitude,
    /// Morlet instantaneous phase at the band center.
    Phase,
    /// Morlet power at the band center.
    Power,
}

/// Immutable preparation settings.
#[derive(Debug, Clone, Default)]
pub struct PrepareConfig {
    pub detrend: bool,
    pub demean: bool,
    pub filter: Option<FiltSpec>,
    pub display: DisplayAs,
}

impl PrepareConfig {
    /// Apply the preparation sequence to `x`.
    ///
    /// The wavelet views need a center frequency; it is taken from the
    /// filter band (geometric center of a pair, the single cutoff
    /// otherwise). Requesting a wavelet view without a filter spec is a
    /// configuration error.
    pub fn prepare(&self, sf: f64, x: &[f64]) -> Result<Vec<f64>> {
        check_sf(sf)?;
        check_finite(x)?;

        let mut data = x.to_vec();
        if self.detrend {
            data = detrend(&data);
        }
        if self.demean {
            data = demean(&data);
        }
        if let Some(fs) = &self.filter {
            data = filt(sf, fs.cutoff, &data, fs.band, fs.method, fs.way, fs.order)?;
        }

        let view = match self.display {
            DisplayAs::Filtered => return Ok(data),
            DisplayAs::Amplitude => WaveletView::Amplitude,
            DisplayAs::Phase => WaveletView::Phase,
            DisplayAs::Power => WaveletView::Power,
        };
        let center = match self.filter {
            Some(FiltSpec {
                cutoff: Cutoff::Pair(lo, hi),
                ..
            }) => (lo * hi).sqrt(),
            Some(FiltSpec {
                cutoff: Cutoff::Single(f),
                ..
            }) => f,
            None => {
                return Err(crate::Error::Config(
                    "wavelet view requires a filter band for its center frequency".into(),
                ))
            }
        };
        ndmorlet(&data, sf, center, Some(view))
    }
}
