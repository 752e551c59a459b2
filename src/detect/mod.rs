//! Detector bank: one module per physiological event family.
//!
//! Every detector follows the same pipeline: validate inputs → optionally
//! gate by hypnogram stage → compute a characteristic energy/amplitude
//! signal → threshold it → group crossings into spans → merge near
//! neighbours → drop spans failing duration/amplitude/frequency bounds.
//! An empty result is a valid "no events" outcome, never an error.
//!
//! Thresholds are heuristics to calibrate per montage, not clinically
//! validated constants.
pub mod kc;
pub mod mt;
pub mod peak;
pub mod rem;
pub mod slow_wave;
pub mod spindles;

pub use kc::{kcdetect, KcConfig};
pub use mt::{mtdetect, MtConfig};
pub use peak::{peakdetect, Extrema, PeakConfig};
pub use rem::{remdetect, RemConfig};
pub use slow_wave::{slowwavedetect, SlowWaveConfig};
pub use spindles::{spindlesdetect, SpindleConfig};

use crate::error::{check_finite, check_sf, Result};
use crate::event::{span_durations, spans_to_index, Span};
use crate::hypno::{Hypnogram, Stage};
use crate::sigproc::mean_std;

/// Output of a span-producing detector.
///
/// `spans` is always sorted by start index and non-overlapping.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub spans: Vec<Span>,
    /// Per-span oscillation rate in Hz, for detectors that estimate it
    /// (currently the spindle detector).
    pub mean_freq: Option<Vec<f64>>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn count(&self) -> usize {
        self.spans.len()
    }

    /// Flattened sample-index set covered by the detected spans.
    pub fn indices(&self) -> Vec<usize> {
        spans_to_index(&self.spans)
    }

    /// Per-span duration in seconds.
    pub fn durations(&self, sf: f64) -> Vec<f64> {
        span_durations(&self.spans, sf)
    }

    /// Events per minute of record.
    pub fn density_per_min(&self, record_len: usize, sf: f64) -> f64 {
        if record_len == 0 {
            return 0.0;
        }
        self.spans.len() as f64 / (record_len as f64 / sf / 60.0)
    }
}

/// Common entry validation: positive sampling rate, finite samples, and a
/// hypnogram (when supplied) covering exactly the signal.
pub(crate) fn validate_inputs(x: &[f64], sf: f64, hypno: Option<&Hypnogram>) -> Result<()> {
    check_sf(sf)?;
    check_finite(x)?;
    if let Some(h) = hypno {
        h.check_len(x.len())?;
    }
    Ok(())
}

/// `mean + k·std` of the characteristic signal.
pub(crate) fn adaptive_threshold(x: &[f64], k: f64) -> f64 {
    let (mean, std) = mean_std(x);
    mean + k * std
}

/// Indices where the characteristic signal strictly exceeds `thr`,
/// restricted to gated samples when a mask is given.
pub(crate) fn above_threshold(x: &[f64], thr: f64, gate: Option<&[bool]>) -> Vec<usize> {
    x.iter()
        .enumerate()
        .filter(|&(i, &v)| v > thr && gate.map_or(true, |g| g[i]))
        .map(|(i, _)| i)
        .collect()
}

/// Gate mask for an optional hypnogram + allowed-stage set.
///
/// Returns `None` (no gating) when either is absent.
pub(crate) fn stage_gate(
    hypno: Option<&Hypnogram>,
    allowed: Option<&[Stage]>,
) -> Option<Vec<bool>> {
    match (hypno, allowed) {
        (Some(h), Some(stages)) => Some(h.gate_mask(stages)),
        _ => None,
    }
}

/// Keep spans whose duration in ms lies inside `[min_ms, max_ms]`.
pub(crate) fn filter_duration(spans: Vec<Span>, sf: f64, min_ms: f64, max_ms: f64) -> Vec<Span> {
    spans
        .into_iter()
        .filter(|s| {
            let ms = s.duration(sf) * 1000.0;
            ms >= min_ms && ms <= max_ms
        })
        .collect()
}

/// Keep spans whose raw peak-to-peak amplitude lies inside
/// `[min_amp, max_amp]`.
pub(crate) fn filter_amplitude(
    spans: Vec<Span>,
    x: &[f64],
    min_amp: f64,
    max_amp: f64,
) -> Vec<Span> {
    use crate::event::span_amplitude;
    let amps = span_amplitude(x, &spans);
    spans
        .into_iter()
        .zip(amps)
        .filter(|(_, a)| *a >= min_amp && *a <= max_amp)
        .map(|(s, _)| s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_threshold_of_flat_signal() {
        let thr = adaptive_threshold(&[2.0; 100], 3.0);
        approx::assert_abs_diff_eq!(thr, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn above_threshold_respects_gate() {
        let x = [0.0, 5.0, 5.0, 0.0, 5.0];
        let gate = [true, true, false, true, true];
        assert_eq!(above_threshold(&x, 1.0, Some(&gate)), vec![1, 4]);
        assert_eq!(above_threshold(&x, 1.0, None), vec![1, 2, 4]);
    }

    #[test]
    fn duration_filter_bounds_inclusive() {
        let spans = vec![Span::new(0, 9), Span::new(20, 119)];
        // At 100 Hz: 100 ms and 1000 ms.
        let kept = filter_duration(spans, 100.0, 100.0, 1000.0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn density_per_min() {
        let det = Detection {
            spans: vec![Span::new(0, 10), Span::new(50, 60)],
            mean_freq: None,
        };
        // 2 events in 30 s → 4 per minute.
        approx::assert_abs_diff_eq!(det.density_per_min(3000, 100.0), 4.0, epsilon = 1e-12);
    }
}
