//! # somnoscan — sleep polysomnography analysis core
//!
//! `somnoscan` is the numeric core of a sleep-scoring tool: it scans
//! single-channel EEG/EOG/EMG recordings for physiological events and
//! derives transition structure and statistics from a sleep-stage
//! hypnogram. It is a pure, synchronous library — no GUI, no file
//! formats, no threads; the caller owns presentation and persistence.
//!
//! ## Pipeline overview
//!
//! ```text
//! signal (Vec<f64>) + sf (Hz) + optional Hypnogram
//!   │
//!   ├─ prepare            detrend / demean / band filter / wavelet view
//!   ├─ filter             Butterworth & Bessel IIR, lfilter / filtfilt
//!   ├─ spectral           Morlet transform, Morlet & Welch power maps
//!   ├─ detect             K-complex, spindle, REM, slow-wave, muscle
//!   │                     twitch, generic peaks → sorted disjoint Spans
//!   ├─ event              index ⇄ span algebra, merging, per-span stats
//!   └─ hypno              stage transitions, sleep statistics
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use somnoscan::{spindlesdetect, Hypnogram, SpindleConfig};
//!
//! let sf = 256.0;
//! let eeg: Vec<f64> = load_channel();                // your acquisition layer
//! let hypno = Hypnogram::from_labels(&load_stages())?; // -1..4 per sample
//!
//! let det = spindlesdetect(&eeg, sf, &SpindleConfig::default(), Some(&hypno))?;
//! for (span, dur) in det.spans.iter().zip(det.durations(sf)) {
//!     println!("spindle at {}..={} ({dur:.2} s)", span.start, span.stop);
//! }
//! # fn load_channel() -> Vec<f64> { vec![] }
//! # fn load_stages() -> Vec<i8> { vec![] }
//! # Ok::<(), somnoscan::Error>(())
//! ```
//!
//! Detector thresholds are configurable heuristics; nothing here claims
//! clinical validation. Empty results are valid outcomes, not errors.

pub mod detect;
pub mod error;
pub mod event;
pub mod filter;
pub mod hypno;
pub mod prepare;
pub mod sigproc;
pub mod spectral;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `somnoscan::Foo` without having to know the internal module layout.

// error
pub use error::{Error, Result};

// filter
pub use filter::{filt, filtfilt, lfilter, Band, Cutoff, Iir, Method, Sos, Way};

// spectral
pub use spectral::{morlet, morlet_power, ndmorlet, welch_power, WaveletView};

// prepare
pub use prepare::{DisplayAs, FiltSpec, PrepareConfig};

// event algebra
pub use event::{
    index_to_spans, indices_from_mask, merge_close_spans, remove_spans, span_amplitude,
    span_durations, span_mean_freq, spans_to_index, Span,
};

// hypnogram
pub use hypno::{sleepstats, transient, transient_times, Hypnogram, SleepStats, Stage, Transitions};

// detectors
pub use detect::{
    kcdetect, mtdetect, peakdetect, remdetect, slowwavedetect, spindlesdetect, Detection, Extrema,
    KcConfig, MtConfig, PeakConfig, RemConfig, SlowWaveConfig, SpindleConfig,
};
