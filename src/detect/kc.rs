//! K-complex detection.
//!
//! K-complexes are large biphasic delta-band deflections, mostly in N2.
//! The detector thresholds a smoothed delta-band envelope, then demands
//! that each candidate span carries enough relative delta power (the
//! "probability" gate) and a plausible peak-to-peak amplitude.
use crate::detect::{
    above_threshold, adaptive_threshold, filter_amplitude, filter_duration, stage_gate,
    validate_inputs, Detection,
};
use crate::error::Result;
use crate::event::{merge_close_spans, remove_spans, Span};
use crate::filter::{filt, Band, Cutoff, Method, Way};
use crate::hypno::{Hypnogram, Stage};
use crate::sigproc::{normalize_range, smoothing, Window};

/// K-complex detector tunables.
#[derive(Debug, Clone)]
pub struct KcConfig {
    /// Minimum normalised delta-power "probability" (0..1) a span must
    /// average to survive.
    pub proba_thr: f64,
    /// Envelope threshold in standard deviations above the mean.
    pub amp_thr: f64,
    /// Delta band, Hz.
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
    /// Stages analysed when a hypnogram is supplied.
    pub gate: Option<Vec<Stage>>,
}

impl Default for KcConfig {
    fn default() -> Self {
        KcConfig {
            proba_thr: 0.6,
            amp_thr: 2.0,
            freq_low: 0.5,
            freq_high: 4.0,
            min_duration_ms: 500.0,
            max_duration_ms: 1500.0,
            min_amp: 0.0,
            max_amp: f64::INFINITY,
            min_distance_ms: 500.0,
            gate: Some(vec![Stage::N2, Stage::N3]),
        }
    }
}

/// Detect K-complexes in a single channel.
pub fn kcdetect(
    x: &[f64],
    sf: f64,
    cfg: &KcConfig,
    hypno: Option<&Hypnogram>,
) -> Result<Detection> {
    validate_inputs(x, sf, hypno)?;
    if x.is_empty() {
        return Ok(Detection::default());
    }

    // Delta-band envelope: rectified filtered signal, smoothed over 200 ms.
    let band = Cutoff::Pair(cfg.freq_low, cfg.freq_high);
    let xf = filt(sf, band, x, Band::Bandpass, Method::Butterworth, Way::FiltFilt, 3)?;
    let rect: Vec<f64> = xf.iter().map(|v| v.abs()).collect();
    let env = smoothing(&rect, (0.2 * sf).round() as usize, Window::Hanning);

    let thr = adaptive_threshold(&env, cfg.amp_thr);
    let gate = stage_gate(hypno, cfg.gate.as_deref());
    let above = above_threshold(&env, thr, gate.as_deref());

    let spans = merge_close_spans(&above, cfg.min_distance_ms, sf);
    let spans = filter_duration(spans, sf, cfg.min_duration_ms, cfg.max_duration_ms);
    let spans = filter_amplitude(spans, x, cfg.min_amp, cfg.max_amp);

    // Probability gate: relative delta prominence over a 2 s window,
    // rescaled to [0, 1] across the record.
    let proba = normalize_range(
        &smoothing(&env, (2.0 * sf).round() as usize, Window::Flat),
        0.0,
        1.0,
    );
    let drop: Vec<usize> = spans
        .iter()
        .enumerate()
        .filter(|(_, s)| span_mean(&proba, s) < cfg.proba_thr)
        .map(|(i, _)| i)
        .collect();
    let spans = remove_spans(&spans, &drop);

    Ok(Detection {
        spans,
        mean_freq: None,
    })
}

fn span_mean(x: &[f64], s: &Span) -> f64 {
    let seg = &x[s.start..=s.stop.min(x.len() - 1)];
    seg.iter().sum::<f64>() / seg.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::spans_are_disjoint_sorted;

    const SF: f64 = 100.0;

    /// 60 s of faint background with one 1-s biphasic delta transient at
    /// 30 s.
    fn kc_signal() -> Vec<f64> {
        let n = (60.0 * SF) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / SF;
                let mut v = 0.5 * (2.0 * std::f64::consts::PI * 10.0 * t).sin();
                if (30.0..31.0).contains(&t) {
                    // One full 1 Hz cycle: sharp negative then positive wave.
                    v += -80.0 * (2.0 * std::f64::consts::PI * (t - 30.0)).sin();
                }
                v
            })
            .collect()
    }

    #[test]
    fn finds_the_complex() {
        let x = kc_signal();
        let det = kcdetect(&x, SF, &KcConfig::default(), None).unwrap();
        assert_eq!(det.count(), 1, "spans: {:?}", det.spans);
        assert!(spans_are_disjoint_sorted(&det.spans));
        let s = det.spans[0];
        let center = (s.start + s.stop) as f64 / 2.0 / SF;
        assert!((center - 30.5).abs() < 0.5, "span center at {center} s");
    }

    #[test]
    fn amplitude_bounds_reject_small_events() {
        let x = kc_signal();
        let cfg = KcConfig {
            min_amp: 500.0,
            ..Default::default()
        };
        let det = kcdetect(&x, SF, &cfg, None).unwrap();
        assert!(det.is_empty());
    }

    #[test]
    fn gated_to_n2() {
        let x = kc_signal();
        // Stage the KC region as N2, everything else wake.
        let labels: Vec<i8> = (0..x.len())
            .map(|i| {
                let t = i as f64 / SF;
                if (25.0..35.0).contains(&t) {
                    2
                } else {
                    0
                }
            })
            .collect();
        let h = Hypnogram::from_labels(&labels).unwrap();
        let det = kcdetect(&x, SF, &KcConfig::default(), Some(&h)).unwrap();
        assert_eq!(det.count(), 1);

        // All-wake hypnogram suppresses it.
        let wake = Hypnogram::from_labels(&vec![0i8; x.len()]).unwrap();
        let det = kcdetect(&x, SF, &KcConfig::default(), Some(&wake)).unwrap();
        assert!(det.is_empty());
    }

    #[test]
    fn zero_signal_yields_empty() {
        let det = kcdetect(&vec![0.0; 6000], SF, &KcConfig::default(), None).unwrap();
        assert!(det.is_empty());
    }

    #[test]
    fn hypno_mismatch_rejected() {
        let x = kc_signal();
        let h = Hypnogram::from_labels(&[2, 2, 2]).unwrap();
        assert!(matches!(
            kcdetect(&x, SF, &KcConfig::default(), Some(&h)),
            Err(crate::Error::Validation(_))
        ));
    }
}
