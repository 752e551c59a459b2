//! Event index algebra properties.
use rand::prelude::*;
use somnoscan::{
    index_to_spans, indices_from_mask, merge_close_spans, span_durations, spans_to_index, Span,
};

#[test]
fn round_trip_random_index_sets() {
    // spans_to_index ∘ index_to_spans is the identity on any strictly
    // increasing index sequence.
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut idx: Vec<usize> = (0..2000).filter(|_| rng.gen_bool(0.3)).collect();
        idx.dedup();
        assert_eq!(spans_to_index(&index_to_spans(&idx)), idx);
    }
}

#[test]
fn spans_from_mask() {
    let mask = [false, true, true, false, false, true];
    let idx = indices_from_mask(&mask);
    assert_eq!(idx, vec![1, 2, 5]);
    assert_eq!(
        index_to_spans(&idx),
        vec![Span::new(1, 2), Span::new(5, 5)]
    );
}

#[test]
fn spans_always_sorted_disjoint() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let idx: Vec<usize> = (0..500).filter(|_| rng.gen_bool(0.4)).collect();
        let spans = index_to_spans(&idx);
        for w in spans.windows(2) {
            assert!(w[0].stop < w[1].start, "overlap between {:?} and {:?}", w[0], w[1]);
        }
        let merged = merge_close_spans(&idx, 30.0, 100.0);
        for w in merged.windows(2) {
            assert!(w[0].stop < w[1].start);
        }
    }
}

#[test]
fn merging_never_loses_coverage() {
    let idx = vec![0, 1, 5, 6, 20, 21];
    let merged = merge_close_spans(&idx, 40.0, 100.0);
    let covered = spans_to_index(&merged);
    for i in idx {
        assert!(covered.contains(&i), "index {i} lost by merging");
    }
}

#[test]
fn duration_unit_conversion() {
    let spans = [Span::new(10, 59), Span::new(100, 299)];
    let d = span_durations(&spans, 100.0);
    assert!((d[0] - 0.5).abs() < 1e-12);
    assert!((d[1] - 2.0).abs() < 1e-12);
}
