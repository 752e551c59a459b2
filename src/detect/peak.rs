//! Generic peak detection (lookahead local extrema).
//!
//! The simplest detector: no hypnogram, no band filtering. A candidate
//! maximum is confirmed once the signal has dropped by `delta` and no
//! higher sample appears within the lookahead horizon (mirrored for
//! minima).
use crate::error::{Error, Result};

/// Which extrema to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrema {
    Max,
    Min,
    /// Both kinds, interleaved in temporal order.
    MinMax,
}

/// Peak detector tunables.
#[derive(Debug, Clone)]
pub struct PeakConfig {
    pub get: Extrema,
    /// Samples to look ahead before confirming an extremum. Must be
    /// shorter than half the period of the fastest oscillation of
    /// interest.
    pub lookahead: usize,
    /// Minimum drop/rise relative to the candidate, as a fraction of the
    /// signal peak-to-peak range. `None` accepts any wiggle.
    pub threshold: Option<f64>,
}

impl Default for PeakConfig {
    fn default() -> Self {
        PeakConfig {
            get: Extrema::Max,
            lookahead: 200,
            threshold: None,
        }
    }
}

/// Detect local extrema, returning their sample indices in temporal order.
pub fn peakdetect(x: &[f64], cfg: &PeakConfig) -> Result<Vec<usize>> {
    crate::error::check_finite(x)?;
    if cfg.lookahead == 0 {
        return Err(Error::config("lookahead must be >= 1"));
    }
    if let Some(t) = cfg.threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(Error::config(format!(
                "peak threshold must be in [0, 1], got {t}"
            )));
        }
    }
    let n = x.len();
    if n < 2 * cfg.lookahead {
        return Ok(vec![]);
    }

    let (min_v, max_v) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| {
            (a.min(v), b.max(v))
        });
    let delta = cfg.threshold.map_or(f64::EPSILON, |t| t * (max_v - min_v));

    let mut maxima = Vec::new();
    let mut minima = Vec::new();

    let mut mx = f64::NEG_INFINITY;
    let mut mn = f64::INFINITY;
    let mut mx_pos = 0usize;
    let mut mn_pos = 0usize;

    for i in 0..n - cfg.lookahead {
        let v = x[i];
        if v > mx {
            mx = v;
            mx_pos = i;
        }
        if v < mn {
            mn = v;
            mn_pos = i;
        }

        // Confirmed maximum: dropped by delta and nothing higher ahead.
        if v < mx - delta {
            let ahead = &x[i..(i + cfg.lookahead).min(n)];
            if ahead.iter().all(|&a| a < mx) {
                maxima.push(mx_pos);
                mx = f64::NEG_INFINITY;
                mn = v;
                mn_pos = i;
                continue;
            }
        }

        // Confirmed minimum: rose by delta and nothing lower ahead.
        if v > mn + delta {
            let ahead = &x[i..(i + cfg.lookahead).min(n)];
            if ahead.iter().all(|&a| a > mn) {
                minima.push(mn_pos);
                mn = f64::INFINITY;
                mx = v;
                mx_pos = i;
            }
        }
    }

    // The scan can emit a boundary sample when the record starts or ends
    // mid-slope; keep only confirmed interior extrema.
    let local_max = |i: usize| {
        i > 0
            && i < n - 1
            && ((x[i] >= x[i - 1] && x[i] > x[i + 1]) || (x[i] > x[i - 1] && x[i] >= x[i + 1]))
    };
    let local_min = |i: usize| {
        i > 0
            && i < n - 1
            && ((x[i] <= x[i - 1] && x[i] < x[i + 1]) || (x[i] < x[i - 1] && x[i] <= x[i + 1]))
    };
    maxima.retain(|&i| local_max(i));
    minima.retain(|&i| local_min(i));

    Ok(match cfg.get {
        Extrema::Max => maxima,
        Extrema::Min => minima,
        Extrema::MinMax => {
            let mut all: Vec<usize> = maxima.into_iter().chain(minima).collect();
            all.sort_unstable();
            all
        }
    })
}
