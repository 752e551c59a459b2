//! Muscle-twitch (EMG artifact) detection.
//!
//! Twitches show up as brief high-frequency bursts. The characteristic
//! signal is the smoothed Teager–Kaiser energy of the 25–50 Hz band,
//! which responds to both amplitude and frequency of the burst.
use crate::detect::{
    above_threshold, adaptive_threshold, filter_amplitude, filter_duration, stage_gate,
    validate_inputs, Detection,
};
use crate::error::Result;
use crate::event::merge_close_spans;
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::hypno::{Hypnogram, Stage};
use crate::sigproc::{smoothing, tkeo, Window};

/// Muscle-twitch detector tunables.
#[derive(Debug, Clone)]
pub struct MtConfig {
    /// Energy threshold in standard deviations above the mean.
    pub threshold: f64,
    /// EMG band, Hz. The high edge is clamped below Nyquist for
    /// low-rate recordings.
    pub freq_low: f64,
    pub freq_high: f64,
    /// Accepted event duration, ms.
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Accepted raw peak-to-peak amplitude, signal units.
    pub min_amp: f64,
    pub max_amp: f64,
    /// Gaps shorter than this are merged, ms.
    pub min_distance_ms: f64,
    /// Stages analysed when a hypnogram is supplied. REM is excluded by
    /// default: physiological REM atonia breaks make separate events.
    pub gate: Option<Vec<Stage>>,
}

impl Default for MtConfig {
    fn default() -> Self {
        MtConfig {
            threshold: 3.0,
            freq_low: 25.0,
            freq_high: 50.0,
            min_duration_ms: 100.0,
            max_duration_ms: 2000.0,
            min_amp: 0.0,
            max_amp: f64::INFINITY,
            min_distance_ms: 1000.0,
            gate: Some(vec![Stage::Wake, Stage::N1, Stage::N2, Stage::N3]),
        }
    }
}

/// Detect muscle twitches in a single EMG channel.
pub fn mtdetect(
    x: &[f64],
    sf: f64,
    cfg: &MtConfig,
    hypno: Option<&Hypnogram>,
) -> Result<Detection> {
    validate_inputs(x, sf, hypno)?;
    if x.is_empty() {
        return Ok(Detection::default());
    }

    let hi = cfg.freq_high.min(0.45 * sf);
    if hi <= cfg.freq_low {
        return Err(crate::Error::Config(format!(
            "EMG band ({}, {}) collapses at sf = {sf} Hz",
            cfg.freq_low, cfg.freq_high
        )));
    }
    let band = Cutoff::Pair(cfg.freq_low, hi);
    let xf = filt(sf, band, x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 3)?;
    let energy = smoothing(&tkeo(&xf), (0.1 * sf).round() as usize, Window::Flat);

    let thr = adaptive_threshold(&energy, cfg.threshold);
    let gate = stage_gate(hypno, cfg.gate.as_deref());
    let above = above_threshold(&energy, thr, gate.as_deref());

    let spans = merge_close_spans(&above, cfg.min_distance_ms, sf);
    let spans = filter_duration(spans, sf, cfg.min_duration_ms, cfg.max_duration_ms);
    let spans = filter_amplitude(spans, x, cfg.min_amp, cfg.max_amp);

    Ok(Detection {
        spans,
        mean_freq: None,
    })
}
