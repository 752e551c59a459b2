//! Sleep spindle detection.
//!
//! Spindles are 0.5–2 s bursts of sigma-band (≈ 12–14 Hz) activity riding
//! on the NREM background. The detector thresholds the Morlet amplitude
//! envelope at the sigma center frequency and keeps spans whose duration
//! and oscillation rate look spindle-like.
use crate::detect::{
    above_threshold, adaptive_threshold, filter_duration, stage_gate, validate_inputs, Detection,
};
use crate::error::Result;
use crate::event::{merge_close_spans, remove_spans, span_mean_freq};
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::hypno::{Hypnogram, Stage};
use crate::spectral::{ndmorlet, WaveletView};

/// Spindle detector tunables.
#[derive(Debug, Clone)]
pub struct SpindleConfig {
    /// Envelope threshold in standard deviations above the mean.
    pub threshold: f64,
    /// Sigma band, Hz.
    pub freq_low: f64,
    pub freq_high: f64,
    /// Accepted event duration, ms.
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Gaps shorter than this are merged, ms.
    pub min_distance_ms: f64,
    /// Enforce the per-span oscillation rate to sit near the sigma band.
    pub check_frequency: bool,
    /// Stages analysed when a hypnogram is supplied.
    pub gate: Option<Vec<Stage>>,
}

impl Default for SpindleConfig {
    fn default() -> Self {
        SpindleConfig {
            threshold: 2.0,
            freq_low: 12.0,
            freq_high: 14.0,
            min_duration_ms: 500.0,
            max_duration_ms: 2000.0,
            min_distance_ms: 500.0,
            check_frequency: true,
            gate: Some(vec![Stage::N1, Stage::N2, Stage::N3]),
        }
    }
}

/// Tolerance added around the sigma band when checking per-span
/// oscillation rate.
const FREQ_TOLERANCE_HZ: f64 = 2.0;

/// Detect sleep spindles in a single channel.
///
/// Returns spans sorted by start index, with a per-span mean oscillation
/// frequency estimate.
pub fn spindlesdetect(
    x: &[f64],
    sf: f64,
    cfg: &SpindleConfig,
    hypno: Option<&Hypnogram>,
) -> Result<Detection> {
    validate_inputs(x, sf, hypno)?;
    if x.is_empty() {
        return Ok(Detection::default());
    }

    // Sigma-band signal and its envelope.
    let band = Cutoff::Pair(cfg.freq_low, cfg.freq_high);
    let xf = filt(sf, band, x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 3)?;
    let center = (cfg.freq_low * cfg.freq_high).sqrt();
    let env = ndmorlet(&xf, sf, center, Some(WaveletView::Amplitude))?;

    let thr = adaptive_threshold(&env, cfg.threshold);
    let gate = stage_gate(hypno, cfg.gate.as_deref());
    let above = above_threshold(&env, thr, gate.as_deref());

    let spans = merge_close_spans(&above, cfg.min_distance_ms, sf);
    let spans = filter_duration(spans, sf, cfg.min_duration_ms, cfg.max_duration_ms);

    // Oscillation-rate check on the band-filtered signal.
    let freqs = span_mean_freq(&xf, &above, &spans, sf);
    let (spans, freqs) = if cfg.check_frequency {
        let drop: Vec<usize> = freqs
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                **f < cfg.freq_low - FREQ_TOLERANCE_HZ || **f > cfg.freq_high + FREQ_TOLERANCE_HZ
            })
            .map(|(i, _)| i)
            .collect();
        let kept_freqs: Vec<f64> = freqs
            .iter()
            .enumerate()
            .filter(|(i, _)| !drop.contains(i))
            .map(|(_, &f)| f)
            .collect();
        (remove_spans(&spans, &drop), kept_freqs)
    } else {
        (spans, freqs)
    };

    Ok(Detection {
        spans,
        mean_freq: Some(freqs),
    })
}
