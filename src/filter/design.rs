//! IIR filter design: Butterworth and Bessel, any band type.
//!
//! Pipeline: analog lowpass prototype poles → band transform in zpk form →
//! bilinear transform with prewarping → cascaded second-order sections.
//! Frequencies are given in Hz and validated against the Nyquist rate; all
//! math is done in `f64` with complex pole/zero arithmetic.
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{check_sf, Error, Result};

/// Frequency response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Bandpass,
    Bandstop,
    Highpass,
    Lowpass,
}

/// Analog prototype family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Maximally flat passband.
    Butterworth,
    /// Maximally flat group delay (roots of the reverse Bessel polynomial).
    Bessel,
}

/// How the designed filter is applied to the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Way {
    /// Forward-backward application, zero phase distortion.
    FiltFilt,
    /// Single causal forward pass.
    LFilter,
}

/// One or two cutoff frequencies in Hz.
///
/// `Lowpass`/`Highpass` take a single cutoff, `Bandpass`/`Bandstop` a
/// `(low, high)` pair with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutoff {
    Single(f64),
    Pair(f64, f64),
}

impl Cutoff {
    fn validate(&self, sf: f64, band: Band) -> Result<()> {
        let nyq = sf / 2.0;
        let check = |f: f64| -> Result<()> {
            if f > 0.0 && f < nyq {
                Ok(())
            } else {
                Err(Error::config(format!(
                    "cutoff {f} Hz outside (0, {nyq}) at sf = {sf} Hz"
                )))
            }
        };
        match (*self, band) {
            (Cutoff::Single(f), Band::Lowpass | Band::Highpass) => check(f),
            (Cutoff::Pair(lo, hi), Band::Bandpass | Band::Bandstop) => {
                check(lo)?;
                check(hi)?;
                if lo < hi {
                    Ok(())
                } else {
                    Err(Error::config(format!(
                        "band edges must be ascending, got ({lo}, {hi})"
                    )))
                }
            }
            (Cutoff::Single(_), _) => Err(Error::config(
                "bandpass/bandstop need a (low, high) cutoff pair",
            )),
            (Cutoff::Pair(..), _) => Err(Error::config(
                "lowpass/highpass take a single cutoff",
            )),
        }
    }
}

/// One second-order section: `b` over `a`, with `a[0]` kept at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sos {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

/// Digital IIR filter as a cascade of second-order sections.
///
/// The filter stays in factored form: expanding a high-order narrow-band
/// design into a single `(b, a)` polynomial loses the clustered roots near
/// `z = 1` to rounding and the result can be unstable.
#[derive(Debug, Clone)]
pub struct Iir {
    pub sos: Vec<Sos>,
}

/// Design a digital IIR filter.
///
/// `order` is the analog prototype order (the digital bandpass/bandstop
/// filter has twice as many poles). Bessel prototypes are supported up to
/// order 8.
pub fn design(sf: f64, cutoff: Cutoff, band: Band, method: Method, order: usize) -> Result<Iir> {
    check_sf(sf)?;
    if order == 0 {
        return Err(Error::config("filter order must be >= 1"));
    }
    if method == Method::Bessel && order > 8 {
        return Err(Error::config(format!(
            "Bessel prototype supported up to order 8, got {order}"
        )));
    }
    cutoff.validate(sf, band)?;

    // Analog lowpass prototype (all-pole, unit cutoff, unit DC gain).
    let poles = match method {
        Method::Butterworth => butter_poles(order),
        Method::Bessel => bessel_poles(order),
    };
    let proto = Zpk {
        z: vec![],
        p: poles,
        k: 1.0,
    };

    // Bilinear prewarping at the internal rate fs = 2 with cutoffs
    // normalised to Nyquist beforehand (scipy convention).
    let fs = 2.0;
    let warp = |f: f64| 2.0 * fs * (PI * (f / (sf / 2.0)) / 2.0).tan();

    let analog = match (band, cutoff) {
        (Band::Lowpass, Cutoff::Single(f)) => lp2lp(proto, warp(f)),
        (Band::Highpass, Cutoff::Single(f)) => lp2hp(proto, warp(f)),
        (Band::Bandpass, Cutoff::Pair(lo, hi)) => {
            let (w1, w2) = (warp(lo), warp(hi));
            lp2bp(proto, (w1 * w2).sqrt(), w2 - w1)
        }
        (Band::Bandstop, Cutoff::Pair(lo, hi)) => {
            let (w1, w2) = (warp(lo), warp(hi));
            lp2bs(proto, (w1 * w2).sqrt(), w2 - w1)
        }
        _ => unreachable!("cutoff arity checked above"),
    };

    let digital = bilinear(analog, fs);
    Ok(digital.into_sos())
}

// ── zpk machinery ───────────────────────────────────────────────────────────

/// Zeros, poles, gain.
struct Zpk {
    z: Vec<Complex64>,
    p: Vec<Complex64>,
    k: f64,
}

impl Zpk {
    /// Pair conjugate poles with their nearest zeros into biquads, poles
    /// closest to the unit circle first; the overall gain is folded into
    /// the leading section.
    fn into_sos(self) -> Iir {
        let is_real = |c: Complex64| c.im.abs() <= 1e-8 * c.norm().max(1.0);

        // One representative per conjugate pair, real roots separate.
        let mut pc: Vec<Complex64> = Vec::new();
        let mut pr: Vec<f64> = Vec::new();
        for &p in &self.p {
            if is_real(p) {
                pr.push(p.re);
            } else if p.im > 0.0 {
                pc.push(p);
            }
        }
        let mut zc: Vec<Complex64> = Vec::new();
        let mut zr: Vec<f64> = Vec::new();
        for &z in &self.z {
            if is_real(z) {
                zr.push(z.re);
            } else if z.im > 0.0 {
                zc.push(z);
            }
        }

        let edge = |m: f64| (1.0 - m).abs();
        pc.sort_by(|a, b| edge(a.norm()).total_cmp(&edge(b.norm())));
        pr.sort_by(|a, b| edge(a.abs()).total_cmp(&edge(b.abs())));

        let mut sections: Vec<Sos> = Vec::new();
        for &p in &pc {
            let a = [1.0, -2.0 * p.re, p.norm_sqr()];
            let b = if let Some(z) = take_nearest(&mut zc, p) {
                [1.0, -2.0 * z.re, z.norm_sqr()]
            } else {
                // Two real zeros; the second from the opposite end so
                // sections stay balanced when zeros sit at both ±1.
                match take_nearest_real(&mut zr, p.re) {
                    Some(z1) => match take_nearest_real(&mut zr, -z1) {
                        Some(z2) => [1.0, -(z1 + z2), z1 * z2],
                        None => [1.0, -z1, 0.0],
                    },
                    None => [1.0, 0.0, 0.0],
                }
            };
            sections.push(Sos { b, a });
        }
        while !pr.is_empty() {
            let p1 = pr.remove(0);
            if pr.is_empty() {
                let b = match take_nearest_real(&mut zr, p1) {
                    Some(z) => [1.0, -z, 0.0],
                    None => [1.0, 0.0, 0.0],
                };
                sections.push(Sos {
                    b,
                    a: [1.0, -p1, 0.0],
                });
            } else {
                let p2 = pr.remove(0);
                // Wide bandstop designs can pair two real poles with a
                // conjugate zero pair.
                let b = match take_nearest_real(&mut zr, p1) {
                    Some(z1) => match take_nearest_real(&mut zr, p2) {
                        Some(z2) => [1.0, -(z1 + z2), z1 * z2],
                        None => [1.0, -z1, 0.0],
                    },
                    None => match take_nearest(&mut zc, Complex64::new(p1, 0.0)) {
                        Some(z) => [1.0, -2.0 * z.re, z.norm_sqr()],
                        None => [1.0, 0.0, 0.0],
                    },
                };
                sections.push(Sos {
                    b,
                    a: [1.0, -(p1 + p2), p1 * p2],
                });
            }
        }
        if sections.is_empty() {
            sections.push(Sos {
                b: [1.0, 0.0, 0.0],
                a: [1.0, 0.0, 0.0],
            });
        }
        if let Some(first) = sections.first_mut() {
            for c in &mut first.b {
                *c *= self.k;
            }
        }
        Iir { sos: sections }
    }
}

fn take_nearest(v: &mut Vec<Complex64>, to: Complex64) -> Option<Complex64> {
    let i = v
        .iter()
        .enumerate()
        .min_by(|a, b| (*a.1 - to).norm().total_cmp(&(*b.1 - to).norm()))?
        .0;
    Some(v.swap_remove(i))
}

fn take_nearest_real(v: &mut Vec<f64>, to: f64) -> Option<f64> {
    let i = v
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - to).abs().total_cmp(&(b.1 - to).abs()))?
        .0;
    Some(v.swap_remove(i))
}

fn prod(v: impl Iterator<Item = Complex64>) -> Complex64 {
    v.fold(Complex64::new(1.0, 0.0), |acc, x| acc * x)
}

/// Butterworth analog lowpass poles on the left unit semicircle.
fn butter_poles(order: usize) -> Vec<Complex64> {
    (0..order)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex64::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Bessel analog lowpass poles: roots of the reverse Bessel polynomial,
/// rescaled so the product of pole magnitudes is 1 (unit DC gain, cutoff
/// near 1 rad/s).
fn bessel_poles(order: usize) -> Vec<Complex64> {
    // theta_n(s) coefficients: a_k = (2n-k)! / (2^(n-k) k! (n-k)!), monic.
    let n = order;
    let fact = |m: usize| -> f64 { (1..=m).map(|v| v as f64).product::<f64>().max(1.0) };
    let coeffs: Vec<f64> = (0..=n)
        .map(|k| fact(2 * n - k) / (2f64.powi((n - k) as i32) * fact(k) * fact(n - k)))
        .collect();

    let mut roots = durand_kerner(&coeffs);
    // For the monic theta_n, prod(-p) = a_0; dividing every pole by
    // a_0^(1/n) renormalises the gain to 1.
    let scale = coeffs[0].powf(1.0 / n as f64);
    for r in &mut roots {
        *r /= scale;
    }
    roots
}

/// Durand–Kerner simultaneous root iteration for a monic polynomial with
/// real coefficients `c[k]` of `s^k`, degree `c.len() - 1`.
fn durand_kerner(c: &[f64]) -> Vec<Complex64> {
    let n = c.len() - 1;
    let eval = |s: Complex64| -> Complex64 {
        let mut acc = Complex64::new(0.0, 0.0);
        for k in (0..=n).rev() {
            acc = acc * s + Complex64::new(c[k], 0.0);
        }
        acc
    };
    let seed = Complex64::new(0.4, 0.9);
    let mut roots: Vec<Complex64> = (0..n).map(|i| seed.powi(i as i32 + 1)).collect();
    for _ in 0..200 {
        let mut max_step = 0.0f64;
        for i in 0..n {
            let denom = prod(
                roots
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &r)| roots[i] - r),
            );
            let step = eval(roots[i]) / denom;
            roots[i] -= step;
            max_step = max_step.max(step.norm());
        }
        if max_step < 1e-14 {
            break;
        }
    }
    roots
}

// ── Band transforms (scipy lp2*_zpk equivalents) ────────────────────────────

fn lp2lp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.p.len() - zpk.z.len();
    Zpk {
        z: zpk.z.iter().map(|&z| z * wo).collect(),
        p: zpk.p.iter().map(|&p| p * wo).collect(),
        k: zpk.k * wo.powi(degree as i32),
    }
}

fn lp2hp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.p.len() - zpk.z.len();
    let woc = Complex64::new(wo, 0.0);
    let mut z: Vec<Complex64> = zpk.z.iter().map(|&z| woc / z).collect();
    let p: Vec<Complex64> = zpk.p.iter().map(|&p| woc / p).collect();
    let gain = (prod(zpk.z.iter().map(|&z| -z)) / prod(zpk.p.iter().map(|&p| -p))).re;
    z.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));
    Zpk {
        z,
        p,
        k: zpk.k * gain,
    }
}

fn lp2bp(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.p.len() - zpk.z.len();
    let shift = |r: Complex64| -> (Complex64, Complex64) {
        let half = r * bw / 2.0;
        let disc = (half * half - Complex64::new(wo * wo, 0.0)).sqrt();
        (half + disc, half - disc)
    };
    let mut z = Vec::with_capacity(2 * zpk.z.len() + degree);
    let mut p = Vec::with_capacity(2 * zpk.p.len());
    for &r in &zpk.z {
        let (a, b) = shift(r);
        z.push(a);
        z.push(b);
    }
    for &r in &zpk.p {
        let (a, b) = shift(r);
        p.push(a);
        p.push(b);
    }
    z.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));
    Zpk {
        z,
        p,
        k: zpk.k * bw.powi(degree as i32),
    }
}

fn lp2bs(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.p.len() - zpk.z.len();
    let invert = |r: Complex64| -> (Complex64, Complex64) {
        let q = Complex64::new(bw / 2.0, 0.0) / r;
        let disc = (q * q - Complex64::new(wo * wo, 0.0)).sqrt();
        (q + disc, q - disc)
    };
    let mut z = Vec::with_capacity(2 * zpk.z.len() + 2 * degree);
    let mut p = Vec::with_capacity(2 * zpk.p.len());
    for &r in &zpk.z {
        let (a, b) = invert(r);
        z.push(a);
        z.push(b);
    }
    for &r in &zpk.p {
        let (a, b) = invert(r);
        p.push(a);
        p.push(b);
    }
    // The stopband notches sit at ±j·wo.
    for _ in 0..degree {
        z.push(Complex64::new(0.0, wo));
        z.push(Complex64::new(0.0, -wo));
    }
    let gain = (prod(zpk.z.iter().map(|&z| -z)) / prod(zpk.p.iter().map(|&p| -p))).re;
    Zpk {
        z,
        p,
        k: zpk.k * gain,
    }
}

/// Bilinear transform of an analog zpk at internal sampling rate `fs`.
fn bilinear(zpk: Zpk, fs: f64) -> Zpk {
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let degree = zpk.p.len() - zpk.z.len();
    let mut z: Vec<Complex64> = zpk.z.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    let p: Vec<Complex64> = zpk.p.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    let gain = (prod(zpk.z.iter().map(|&z| fs2 - z)) / prod(zpk.p.iter().map(|&p| fs2 - p))).re;
    // Zeros at infinity map to Nyquist.
    z.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));
    Zpk {
        z,
        p,
        k: zpk.k * gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// |H(e^{jw})| of the section cascade at normalised angular frequency w.
    fn mag(iir: &Iir, w: f64) -> f64 {
        let u = Complex64::new(0.0, -w).exp();
        iir.sos
            .iter()
            .map(|s| {
                let num = Complex64::new(s.b[0], 0.0) + s.b[1] * u + s.b[2] * u * u;
                let den = Complex64::new(s.a[0], 0.0) + s.a[1] * u + s.a[2] * u * u;
                (num / den).norm()
            })
            .product()
    }

    #[test]
    fn butter_poles_left_half_plane() {
        for n in 1..=8 {
            for p in butter_poles(n) {
                assert!(p.re < 0.0, "unstable prototype pole {p}");
                approx::assert_abs_diff_eq!(p.norm(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn bessel_poles_left_half_plane() {
        for n in 1..=8 {
            for p in bessel_poles(n) {
                assert!(p.re < 0.0, "unstable Bessel pole {p} at order {n}");
            }
        }
    }

    #[test]
    fn lowpass_passes_dc_blocks_nyquist() {
        let iir = design(256.0, Cutoff::Single(30.0), Band::Lowpass, Method::Butterworth, 4).unwrap();
        approx::assert_abs_diff_eq!(mag(&iir, 0.0), 1.0, epsilon = 1e-8);
        assert!(mag(&iir, PI) < 1e-6);
    }

    #[test]
    fn highpass_blocks_dc() {
        let iir = design(256.0, Cutoff::Single(1.0), Band::Highpass, Method::Butterworth, 3).unwrap();
        assert!(mag(&iir, 0.0) < 1e-8);
        approx::assert_abs_diff_eq!(mag(&iir, PI), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn bandpass_center_unity() {
        let sf = 200.0;
        let iir = design(sf, Cutoff::Pair(10.0, 16.0), Band::Bandpass, Method::Butterworth, 3).unwrap();
        let w_center = 2.0 * PI * (10.0f64 * 16.0).sqrt() / sf;
        let g = mag(&iir, w_center);
        assert!(g > 0.9 && g < 1.1, "center gain {g}");
        assert!(mag(&iir, 1e-9) < 1e-6, "bandpass passes DC");
    }

    #[test]
    fn bandstop_notches_center() {
        let sf = 200.0;
        let iir = design(sf, Cutoff::Pair(45.0, 55.0), Band::Bandstop, Method::Butterworth, 2).unwrap();
        let w_center = 2.0 * PI * (45.0f64 * 55.0).sqrt() / sf;
        assert!(mag(&iir, w_center) < 1e-3);
        approx::assert_abs_diff_eq!(mag(&iir, 0.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn bessel_lowpass_monotone_rolloff() {
        let iir = design(256.0, Cutoff::Single(20.0), Band::Lowpass, Method::Bessel, 4).unwrap();
        approx::assert_abs_diff_eq!(mag(&iir, 0.0), 1.0, epsilon = 1e-6);
        assert!(mag(&iir, PI * 0.9) < 0.05);
    }

    #[test]
    fn narrow_band_high_order_sections_are_stable() {
        // Order-5 bandpass over a 2 Hz band at 512 Hz: the poles cluster
        // near z = 1 and must stay strictly inside the unit circle in
        // every section.
        let sf = 512.0;
        let iir = design(sf, Cutoff::Pair(2.0, 4.0), Band::Bandpass, Method::Butterworth, 5).unwrap();
        for s in &iir.sos {
            assert!(
                s.a[2].abs() < 1.0,
                "section pole radius^2 = {} out of bounds",
                s.a[2]
            );
        }
        let w_center = 2.0 * PI * (2.0f64 * 4.0).sqrt() / sf;
        let g = mag(&iir, w_center);
        assert!(g > 0.9 && g < 1.1, "center gain {g}");
        assert!(mag(&iir, 1e-9) < 1e-9, "bandpass passes DC");
    }

    #[test]
    fn rejects_bad_cutoffs() {
        assert!(design(100.0, Cutoff::Single(60.0), Band::Lowpass, Method::Butterworth, 2).is_err());
        assert!(design(100.0, Cutoff::Single(0.0), Band::Highpass, Method::Butterworth, 2).is_err());
        assert!(design(100.0, Cutoff::Pair(20.0, 10.0), Band::Bandpass, Method::Butterworth, 2).is_err());
        assert!(design(100.0, Cutoff::Single(10.0), Band::Bandpass, Method::Butterworth, 2).is_err());
        assert!(design(100.0, Cutoff::Pair(5.0, 10.0), Band::Lowpass, Method::Butterworth, 2).is_err());
        assert!(design(100.0, Cutoff::Single(10.0), Band::Lowpass, Method::Butterworth, 0).is_err());
        assert!(design(100.0, Cutoff::Single(10.0), Band::Lowpass, Method::Bessel, 9).is_err());
    }
}
