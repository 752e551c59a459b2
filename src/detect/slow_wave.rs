//! Slow-wave (delta) detection.
//!
//! Slow waves are high-amplitude 0.1–4 Hz oscillations dominating N3.
//! Unlike the adaptive detectors, the threshold here is a fraction of the
//! smoothed delta envelope maximum, so the detector picks the most
//! prominent delta segments of the record.
use crate::detect::{above_threshold, filter_amplitude, filter_duration, validate_inputs, Detection};
use crate::error::Result;
use crate::event::merge_close_spans;
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::sigproc::{smoothing, Window};
use crate::spectral::{ndmorlet, WaveletView};

/// Slow-wave detector tunables.
#[derive(Debug, Clone)]
pub struct SlowWaveConfig {
    /// Threshold as a fraction of the envelope maximum, in (0, 1].
    pub threshold_frac: f64,
    /// Delta band, Hz.
    pub freq_low: f64,
    pub freq_high: f64,
    /// Envelope smoothing window, seconds.
    pub smoothing_s: f64,
    /// Minimum event duration, ms.
    pub min_duration_ms: f64,
    /// Accepted raw peak-to-peak amplitude, signal units.
    pub min_amp: f64,
    pub max_amp: f64,
    /// Gaps shorter than this are merged, ms.
    pub min_distance_ms: f64,
}

impl Default for SlowWaveConfig {
    fn default() -> Self {
        SlowWaveConfig {
            threshold_frac: 0.8,
            freq_low: 0.1,
            freq_high: 4.0,
            smoothing_s: 2.0,
            min_duration_ms: 500.0,
            min_amp: 0.0,
            max_amp: f64::INFINITY,
            min_distance_ms: 500.0,
        }
    }
}

/// Detect slow waves in a single channel.
///
/// The slow-wave detector is not hypnogram-gated: delta prominence is
/// meaningful on its own and the caller can intersect the result with N3
/// spans if desired.
pub fn slowwavedetect(x: &[f64], sf: f64, cfg: &SlowWaveConfig) -> Result<Detection> {
    validate_inputs(x, sf, None)?;
    if x.is_empty() {
        return Ok(Detection::default());
    }
    if !(cfg.threshold_frac > 0.0 && cfg.threshold_frac <= 1.0) {
        return Err(crate::Error::Config(format!(
            "threshold_frac must be in (0, 1], got {}",
            cfg.threshold_frac
        )));
    }

    let band = Cutoff::Pair(cfg.freq_low, cfg.freq_high);
    let xf = filt(sf, band, x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 3)?;
    let center = (cfg.freq_low * cfg.freq_high).sqrt();
    let env = ndmorlet(&xf, sf, center, Some(WaveletView::Amplitude))?;
    let env = smoothing(&env, (cfg.smoothing_s * sf).round() as usize, Window::Hanning);

    let max = env.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 0.0) {
        return Ok(Detection::default());
    }
    let thr = cfg.threshold_frac * max;
    let above = above_threshold(&env, thr, None);

    let spans = merge_close_spans(&above, cfg.min_distance_ms, sf);
    let spans = filter_duration(spans, sf, cfg.min_duration_ms, f64::INFINITY);
    let spans = filter_amplitude(spans, x, cfg.min_amp, cfg.max_amp);

    Ok(Detection {
        spans,
        mean_freq: None,
    })
}
