//! Hypnogram stages, transition structure and sleep statistics.
//!
//! Stage labels follow the common integer convention (-1 artifact, 0 wake,
//! 1–3 NREM, 4 REM) but only at the conversion boundary; inside the crate
//! a stage is always the [`Stage`] enum.
use std::collections::BTreeMap;

use crate::error::{check_sf, Error, Result};
use crate::event::Span;

/// One scored sleep stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Artifact,
    Wake,
    N1,
    N2,
    N3,
    Rem,
}

impl Stage {
    /// Parse the legacy integer encoding {-1, 0, 1, 2, 3, 4}.
    pub fn from_label(label: i8) -> Result<Self> {
        Ok(match label {
            -1 => Stage::Artifact,
            0 => Stage::Wake,
            1 => Stage::N1,
            2 => Stage::N2,
            3 => Stage::N3,
            4 => Stage::Rem,
            other => {
                return Err(Error::validation(format!(
                    "stage label {other} outside {{-1..4}}"
                )))
            }
        })
    }

    /// Legacy integer encoding.
    pub fn label(self) -> i8 {
        match self {
            Stage::Artifact => -1,
            Stage::Wake => 0,
            Stage::N1 => 1,
            Stage::N2 => 2,
            Stage::N3 => 3,
            Stage::Rem => 4,
        }
    }

    /// True for N1/N2/N3/REM.
    pub fn is_sleep(self) -> bool {
        matches!(self, Stage::N1 | Stage::N2 | Stage::N3 | Stage::Rem)
    }
}

/// A per-sample staged hypnogram.
///
/// Construction validates every label; the stage vector is immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct Hypnogram {
    stages: Vec<Stage>,
}

impl Hypnogram {
    pub fn new(stages: Vec<Stage>) -> Self {
        Hypnogram { stages }
    }

    /// Build from legacy integer labels, rejecting out-of-domain values.
    pub fn from_labels(labels: &[i8]) -> Result<Self> {
        let stages = labels
            .iter()
            .map(|&l| Stage::from_label(l))
            .collect::<Result<Vec<_>>>()?;
        Ok(Hypnogram { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Per-sample mask of samples whose stage is in `allowed`.
    pub fn gate_mask(&self, allowed: &[Stage]) -> Vec<bool> {
        self.stages.iter().map(|s| allowed.contains(s)).collect()
    }

    /// Fail unless the hypnogram covers exactly `n` samples.
    pub fn check_len(&self, n: usize) -> Result<()> {
        if self.len() == n {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "hypnogram has {} samples, signal has {n}",
                self.len()
            )))
        }
    }
}

/// Transition structure of a staged sequence.
#[derive(Debug, Clone)]
pub struct Transitions {
    /// Last index of each stable run, excluding the final run.
    pub indices: Vec<usize>,
    /// (start, stop) span of every stable run, in temporal order.
    pub spans: Vec<Span>,
    /// Stage of each run, aligned with `spans`.
    pub stages: Vec<Stage>,
}

/// Detect stage-change points and stable runs.
///
/// A hypnogram with zero changes yields one run covering the whole record
/// and no transition indices.
pub fn transient(hypno: &Hypnogram) -> Transitions {
    let stages = hypno.stages();
    let mut indices = Vec::new();
    let mut spans = Vec::new();
    let mut run_stages = Vec::new();
    if stages.is_empty() {
        return Transitions {
            indices,
            spans,
            stages: run_stages,
        };
    }
    let mut start = 0usize;
    for i in 1..stages.len() {
        if stages[i] != stages[i - 1] {
            indices.push(i - 1);
            spans.push(Span::new(start, i - 1));
            run_stages.push(stages[i - 1]);
            start = i;
        }
    }
    spans.push(Span::new(start, stages.len() - 1));
    run_stages.push(stages[stages.len() - 1]);
    Transitions {
        indices,
        spans,
        stages: run_stages,
    }
}

/// As [`transient`], with run bounds also converted to seconds by direct
/// division by the sampling rate (no resampling involved).
pub fn transient_times(hypno: &Hypnogram, sf: f64) -> Result<(Transitions, Vec<(f64, f64)>)> {
    check_sf(sf)?;
    let tr = transient(hypno);
    let secs = tr
        .spans
        .iter()
        .map(|s| (s.start as f64 / sf, s.stop as f64 / sf))
        .collect();
    Ok((tr, secs))
}

/// Summary statistics of one hypnogram.
///
/// Durations are in seconds; `sleep_efficiency` is a percentage of total
/// recording time. Artifact samples count toward total time but never
/// toward sleep time.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepStats {
    pub total_time: f64,
    pub total_sleep_time: f64,
    pub sleep_efficiency_pct: f64,
    /// Seconds from record start to the first sleep-staged sample; `None`
    /// when the record contains no sleep.
    pub sleep_onset_latency: Option<f64>,
    /// Wake after sleep onset, seconds.
    pub waso: f64,
    pub wake: f64,
    pub n1: f64,
    pub n2: f64,
    pub n3: f64,
    pub rem: f64,
    pub artifact: f64,
}

impl SleepStats {
    /// Metric-name → value view for export layers. Latency is omitted when
    /// the record has no sleep.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        let mut m = BTreeMap::new();
        m.insert("total_time", self.total_time);
        m.insert("total_sleep_time", self.total_sleep_time);
        m.insert("sleep_efficiency_pct", self.sleep_efficiency_pct);
        if let Some(lat) = self.sleep_onset_latency {
            m.insert("sleep_onset_latency", lat);
        }
        m.insert("waso", self.waso);
        m.insert("wake", self.wake);
        m.insert("n1", self.n1);
        m.insert("n2", self.n2);
        m.insert("n3", self.n3);
        m.insert("rem", self.rem);
        m.insert("artifact", self.artifact);
        m
    }
}

/// Compute sleep statistics from a per-sample hypnogram.
pub fn sleepstats(hypno: &Hypnogram, sf: f64) -> Result<SleepStats> {
    check_sf(sf)?;
    let stages = hypno.stages();
    let n = stages.len();

    let mut counts: BTreeMap<Stage, usize> = BTreeMap::new();
    for &s in stages {
        *counts.entry(s).or_insert(0) += 1;
    }
    let secs = |stage: Stage| -> f64 { *counts.get(&stage).unwrap_or(&0) as f64 / sf };

    let total_time = n as f64 / sf;
    let n1 = secs(Stage::N1);
    let n2 = secs(Stage::N2);
    let n3 = secs(Stage::N3);
    let rem = secs(Stage::Rem);
    let tst = n1 + n2 + n3 + rem;

    let onset = stages.iter().position(|s| s.is_sleep());
    let sleep_onset_latency = onset.map(|i| i as f64 / sf);

    // Wake samples after sleep onset.
    let waso = match onset {
        Some(i) => {
            stages[i..]
                .iter()
                .filter(|s| **s == Stage::Wake)
                .count() as f64
                / sf
        }
        None => 0.0,
    };

    let sleep_efficiency_pct = if total_time > 0.0 {
        100.0 * tst / total_time
    } else {
        0.0
    };

    Ok(SleepStats {
        total_time,
        total_sleep_time: tst,
        sleep_efficiency_pct,
        sleep_onset_latency,
        waso,
        wake: secs(Stage::Wake),
        n1,
        n2,
        n3,
        rem,
        artifact: secs(Stage::Artifact),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypno_from(labels: &[i8]) -> Hypnogram {
        Hypnogram::from_labels(labels).unwrap()
    }

    #[test]
    fn stage_label_round_trip() {
        for l in -1..=4i8 {
            assert_eq!(Stage::from_label(l).unwrap().label(), l);
        }
        assert!(Stage::from_label(5).is_err());
        assert!(Stage::from_label(-2).is_err());
    }

    #[test]
    fn transient_reference_sequence() {
        // Six runs, five transitions; the -1 tail forces a final
        // single-sample run.
        let h = hypno_from(&[0, 0, 0, 1, 1, 2, 2, 2, 3, 4, 4, -1]);
        let tr = transient(&h);
        assert_eq!(tr.indices, vec![2, 4, 7, 8, 10]);
        assert_eq!(
            tr.spans,
            vec![
                Span::new(0, 2),
                Span::new(3, 4),
                Span::new(5, 7),
                Span::new(8, 8),
                Span::new(9, 10),
                Span::new(11, 11),
            ]
        );
        assert_eq!(
            tr.stages,
            vec![Stage::Wake, Stage::N1, Stage::N2, Stage::N3, Stage::Rem, Stage::Artifact]
        );
    }

    #[test]
    fn transient_constant_hypnogram_single_run() {
        let h = hypno_from(&[2; 50]);
        let tr = transient(&h);
        assert!(tr.indices.is_empty());
        assert_eq!(tr.spans, vec![Span::new(0, 49)]);
        assert_eq!(tr.stages, vec![Stage::N2]);
    }

    #[test]
    fn transient_times_divides_by_sf() {
        let h = hypno_from(&[0, 0, 1, 1]);
        let (_, secs) = transient_times(&h, 2.0).unwrap();
        assert_eq!(secs, vec![(0.0, 0.5), (1.0, 1.5)]);
    }

    #[test]
    fn sleepstats_all_wake() {
        let h = hypno_from(&vec![0i8; 3000]);
        let st = sleepstats(&h, 100.0).unwrap();
        assert_eq!(st.total_sleep_time, 0.0);
        assert_eq!(st.sleep_efficiency_pct, 0.0);
        assert_eq!(st.sleep_onset_latency, None);
        assert_eq!(st.waso, 0.0);
        approx::assert_abs_diff_eq!(st.total_time, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn sleepstats_mixed_record() {
        // 100 Hz: 10 s wake, 10 s N2, 5 s wake, 5 s REM, 10 s artifact.
        let mut labels = vec![0i8; 1000];
        labels.extend(vec![2i8; 1000]);
        labels.extend(vec![0i8; 500]);
        labels.extend(vec![4i8; 500]);
        labels.extend(vec![-1i8; 1000]);
        let st = sleepstats(&hypno_from(&labels), 100.0).unwrap();
        approx::assert_abs_diff_eq!(st.total_time, 40.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.total_sleep_time, 15.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.sleep_onset_latency.unwrap(), 10.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.waso, 5.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.n2, 10.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.artifact, 10.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(st.sleep_efficiency_pct, 100.0 * 15.0 / 40.0, epsilon = 1e-9);
    }

    #[test]
    fn from_labels_rejects_out_of_domain() {
        assert!(Hypnogram::from_labels(&[0, 1, 7]).is_err());
    }

    #[test]
    fn gate_mask_selects_stages() {
        let h = hypno_from(&[0, 2, 3, 4, -1]);
        assert_eq!(
            h.gate_mask(&[Stage::N2, Stage::N3]),
            vec![false, true, true, false, false]
        );
    }
}
