//! Rapid-eye-movement burst detection (EOG channels).
//!
//! REMs appear as steep, large deflections of the EOG during REM sleep.
//! The characteristic signal is the absolute centered derivative of the
//! low-frequency filtered trace.
use crate::detect::{
    above_threshold, adaptive_threshold, filter_duration, stage_gate, validate_inputs, Detection,
};
use crate::error::Result;
use crate::event::merge_close_spans;
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::hypno::{Hypnogram, Stage};
use crate::sigproc::{derivative, smoothing, Window};

/// REM detector tunables.
#[derive(Debug, Clone)]
pub struct RemConfig {
    /// Derivative threshold in standard deviations above the mean.
    pub threshold: f64,
    /// Analysis band, Hz.
    pub freq_low: f64,
    pub freq_high: f64,
    /// Centered-derivative window, seconds.
    pub deriv_window_s: f64,
    /// Accepted event duration, ms.
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Gaps shorter than this are merged, ms.
    pub min_distance_ms: f64,
    /// Stages analysed when a hypnogram is supplied.
    pub gate: Option<Vec<Stage>>,
}

impl Default for RemConfig {
    fn default() -> Self {
        RemConfig {
            threshold: 3.0,
            freq_low: 0.5,
            freq_high: 5.0,
            deriv_window_s: 0.1,
            min_duration_ms: 100.0,
            max_duration_ms: 1500.0,
            min_distance_ms: 200.0,
            gate: Some(vec![Stage::Rem]),
        }
    }
}

/// Detect rapid eye movements in a single EOG channel.
pub fn remdetect(
    x: &[f64],
    sf: f64,
    cfg: &RemConfig,
    hypno: Option<&Hypnogram>,
) -> Result<Detection> {
    validate_inputs(x, sf, hypno)?;
    if x.is_empty() {
        return Ok(Detection::default());
    }

    let band = Cutoff::Pair(cfg.freq_low, cfg.freq_high);
    let xf = filt(sf, band, x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 3)?;
    let deriv = derivative(&xf, cfg.deriv_window_s, sf)?;
    let deriv = smoothing(&deriv, (0.1 * sf).round() as usize, Window::Hanning);

    let thr = adaptive_threshold(&deriv, cfg.threshold);
    let gate = stage_gate(hypno, cfg.gate.as_deref());
    let above = above_threshold(&deriv, thr, gate.as_deref());

    let spans = merge_close_spans(&above, cfg.min_distance_ms, sf);
    let spans = filter_duration(spans, sf, cfg.min_duration_ms, cfg.max_duration_ms);

    Ok(Detection {
        spans,
        mean_freq: None,
    })
}
