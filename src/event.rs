//! Event index algebra.
//!
//! Detectors produce strictly increasing sample-index sets where a
//! characteristic signal exceeds a threshold. This module turns those sets
//! into contiguous [`Span`]s and back, merges near-adjacent spans, and
//! computes per-span features (duration, peak-to-peak amplitude,
//! oscillation rate) used by the detectors' acceptance filters.

/// A contiguous run of flagged samples, `start..=stop`, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Self {
        debug_assert!(start <= stop);
        Span { start, stop }
    }

    /// Number of samples covered (stop is inclusive).
    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false // a span always covers at least one sample
    }

    /// Duration in seconds at sampling rate `sf`.
    pub fn duration(&self, sf: f64) -> f64 {
        self.len() as f64 / sf
    }
}

/// Indices of `true` entries, strictly increasing.
pub fn indices_from_mask(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &m)| m.then_some(i))
        .collect()
}

/// Group a strictly increasing index sequence into maximal contiguous runs.
pub fn index_to_spans(indices: &[usize]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut iter = indices.iter().copied();
    let Some(first) = iter.next() else {
        return spans;
    };
    let mut start = first;
    let mut prev = first;
    for i in iter {
        if i != prev + 1 {
            spans.push(Span::new(start, prev));
            start = i;
        }
        prev = i;
    }
    spans.push(Span::new(start, prev));
    spans
}

/// Flatten spans back into the index sequence they cover.
///
/// Inverse of [`index_to_spans`] for any strictly increasing input.
pub fn spans_to_index(spans: &[Span]) -> Vec<usize> {
    spans.iter().flat_map(|s| s.start..=s.stop).collect()
}

/// Per-span duration in seconds.
pub fn span_durations(spans: &[Span], sf: f64) -> Vec<f64> {
    spans.iter().map(|s| s.duration(sf)).collect()
}

/// Drop the spans at the given positions, keeping the survivors in order.
pub fn remove_spans(spans: &[Span], drop_positions: &[usize]) -> Vec<Span> {
    spans
        .iter()
        .enumerate()
        .filter(|(i, _)| !drop_positions.contains(i))
        .map(|(_, &s)| s)
        .collect()
}

/// Fill gaps shorter than `max_gap_ms` between consecutive spans so one
/// physiological event does not fragment into several.
///
/// Works on the flattened index set: any hole narrower than the threshold
/// is filled in, then the result is re-grouped.
pub fn merge_close_spans(indices: &[usize], max_gap_ms: f64, sf: f64) -> Vec<Span> {
    let spans = index_to_spans(indices);
    let max_gap = (max_gap_ms * sf / 1000.0).round() as usize;
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for s in spans {
        match merged.last_mut() {
            Some(last) if s.start - last.stop <= max_gap + 1 => last.stop = s.stop,
            _ => merged.push(s),
        }
    }
    merged
}

/// Oscillation-rate estimate per span: number of local maxima among the
/// above-threshold samples inside the span, divided by the span duration.
///
/// `above` is the strictly increasing set of above-threshold indices the
/// spans were built from.
pub fn span_mean_freq(x: &[f64], above: &[usize], spans: &[Span], sf: f64) -> Vec<f64> {
    spans
        .iter()
        .map(|s| {
            let inside: Vec<usize> = above
                .iter()
                .copied()
                .filter(|&i| i >= s.start && i <= s.stop)
                .collect();
            let peaks = inside
                .windows(3)
                .filter(|w| {
                    w[0] + 1 == w[1]
                        && w[1] + 1 == w[2]
                        && x[w[1]] > x[w[0]]
                        && x[w[1]] > x[w[2]]
                })
                .count();
            peaks as f64 / s.duration(sf)
        })
        .collect()
}

/// Peak-to-peak amplitude of the raw signal within each span.
pub fn span_amplitude(x: &[f64], spans: &[Span]) -> Vec<f64> {
    spans
        .iter()
        .map(|s| {
            let seg = &x[s.start..=s.stop.min(x.len() - 1)];
            let (min, max) = seg
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| {
                    (a.min(v), b.max(v))
                });
            max - min
        })
        .collect()
}

/// Check the detector output invariant: sorted by start, non-overlapping.
pub fn spans_are_disjoint_sorted(spans: &[Span]) -> bool {
    spans.windows(2).all(|w| w[0].stop < w[1].start)
}
