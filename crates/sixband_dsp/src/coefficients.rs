//! Biquad Coefficient Design
//!
//! Maps human-meaningful band parameters (frequency, Q, gain) to normalized
//! second-order filter coefficients. The RBJ (Robert Bristow-Johnson) Audio EQ
//! Cookbook designs come from the `biquad` crate, computed in f64.
//!
//! Every function here is pure: no state, no allocation, callable from the
//! audio thread or any other thread.

use std::f64::consts::SQRT_2;

use biquad::{Coefficients, Errors, Hertz, Type};

/// Sample rate substituted when the host reports a non-positive rate
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Fixed resonance of the high-pass and low-pass bands
pub const PASS_Q: f32 = SQRT_2 as f32;

/// Highest usable cutoff as a fraction of the sample rate (just under Nyquist)
pub const NYQUIST_LIMIT: f32 = 0.49;

/// Lowest frequency the designer will place a pole/zero pair at.
/// Below this, f32 coefficients can no longer keep the poles off the unit circle.
const MIN_DESIGN_FREQ: f64 = 10.0;

/// Q used when a caller passes a non-positive or non-finite Q
const FALLBACK_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Q floor; keeps alpha bounded
const MIN_Q: f64 = 0.05;

/// Linear gain bounds (-60dB..+60dB)
const MIN_GAIN: f64 = 1.0e-3;
const MAX_GAIN: f64 = 1.0e3;

/// Filter shape for each EQ band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterShape {
    LowShelf,
    HighShelf,
    Peaking,
    HighPass,
    LowPass,
}

impl FilterShape {
    /// Whether the gain parameter affects this shape
    pub fn uses_gain(self) -> bool {
        matches!(self, Self::LowShelf | Self::HighShelf | Self::Peaking)
    }
}

/// Convert dB gain to linear amplitude
/// Formula: amplitude = 10^(dB/20)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Replace a non-positive or non-finite sample rate with [`DEFAULT_SAMPLE_RATE`]
#[inline]
pub fn sanitize_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        DEFAULT_SAMPLE_RATE
    }
}

/// Compute normalized (a0 = 1) biquad coefficients for one filter shape.
///
/// * `sample_rate` - Hz; non-positive values fall back to 44.1kHz
/// * `frequency` - corner/center frequency in Hz, kept between 10Hz and 0.49 x sample rate
///   (the upper bound wins when the sample rate is too low for both)
/// * `q` - resonance; must be positive
/// * `linear_gain` - 10^(dB/20); ignored by the pass shapes
///
/// Stable (both poles inside the unit circle) for every finite input.
pub fn compute(
    shape: FilterShape,
    sample_rate: f32,
    frequency: f32,
    q: f32,
    linear_gain: f32,
) -> Coefficients<f32> {
    let fs = f64::from(sanitize_sample_rate(sample_rate));
    let max_freq = fs * f64::from(NYQUIST_LIMIT);
    let freq = if frequency.is_finite() {
        f64::from(frequency).max(MIN_DESIGN_FREQ).min(max_freq)
    } else {
        max_freq * 0.5
    };
    let q = if q.is_finite() && q > 0.0 {
        f64::from(q).max(MIN_Q)
    } else {
        FALLBACK_Q
    };
    let gain = if linear_gain.is_finite() && linear_gain > 0.0 {
        f64::from(linear_gain).clamp(MIN_GAIN, MAX_GAIN)
    } else {
        1.0
    };

    // biquad's shelf/peak types take dB and use A = 10^(dB/40) = sqrt(linear gain)
    let gain_db = 20.0 * gain.log10();
    let filter = match shape {
        FilterShape::LowShelf => Type::LowShelf(gain_db),
        FilterShape::HighShelf => Type::HighShelf(gain_db),
        FilterShape::Peaking => Type::PeakingEQ(gain_db),
        FilterShape::HighPass => Type::HighPass,
        FilterShape::LowPass => Type::LowPass,
    };

    match design(filter, fs, freq, q) {
        Ok(coeffs) => narrow(coeffs),
        Err(_) => identity(),
    }
}

/// Design in f64; the inputs above are already inside what biquad accepts
#[inline]
fn design(filter: Type<f64>, fs: f64, freq: f64, q: f64) -> Result<Coefficients<f64>, Errors> {
    let fs = Hertz::<f64>::from_hz(fs)?;
    let f0 = Hertz::<f64>::from_hz(freq)?;
    Coefficients::<f64>::from_params(filter, fs, f0, q)
}

#[inline]
fn narrow(coeffs: Coefficients<f64>) -> Coefficients<f32> {
    Coefficients {
        b0: coeffs.b0 as f32,
        b1: coeffs.b1 as f32,
        b2: coeffs.b2 as f32,
        a1: coeffs.a1 as f32,
        a2: coeffs.a2 as f32,
    }
}

/// Coefficients that pass the signal through unchanged
pub fn identity() -> Coefficients<f32> {
    Coefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    }
}

/// Stability triangle test for 1 + a1 z^-1 + a2 z^-2:
/// both poles lie strictly inside the unit circle iff |a2| < 1 and |a1| < 1 + a2.
pub fn is_stable(coeffs: &Coefficients<f32>) -> bool {
    let (a1, a2) = (f64::from(coeffs.a1), f64::from(coeffs.a2));
    a2.abs() < 1.0 && a1.abs() < 1.0 + a2
}

/// Largest pole magnitude of the denominator polynomial
pub fn max_pole_magnitude(coeffs: &Coefficients<f32>) -> f64 {
    let (a1, a2) = (f64::from(coeffs.a1), f64::from(coeffs.a2));
    let disc = a1 * a1 - 4.0 * a2;
    if disc < 0.0 {
        // complex conjugate pair: |p|^2 = a2
        a2.sqrt()
    } else {
        let root = disc.sqrt();
        ((-a1 + root) / 2.0).abs().max(((-a1 - root) / 2.0).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::magnitude_at;

    const SHAPES: [FilterShape; 5] = [
        FilterShape::LowShelf,
        FilterShape::HighShelf,
        FilterShape::Peaking,
        FilterShape::HighPass,
        FilterShape::LowPass,
    ];

    fn to_db(gain: f32) -> f32 {
        20.0 * gain.log10()
    }

    fn same(a: &Coefficients<f32>, b: &Coefficients<f32>) -> bool {
        a.b0 == b.b0 && a.b1 == b.b1 && a.b2 == b.b2 && a.a1 == b.a1 && a.a2 == b.a2
    }

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(6.0) - 1.9953).abs() < 1e-3);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_sample_rate_fallback() {
        assert_eq!(sanitize_sample_rate(48000.0), 48000.0);
        assert_eq!(sanitize_sample_rate(0.0), DEFAULT_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(-1.0), DEFAULT_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(f32::NAN), DEFAULT_SAMPLE_RATE);

        let fallback = compute(FilterShape::Peaking, 0.0, 1000.0, 1.0, 2.0);
        let explicit = compute(FilterShape::Peaking, 44100.0, 1000.0, 1.0, 2.0);
        assert!(same(&fallback, &explicit));
    }

    #[test]
    fn test_stable_across_valid_ranges() {
        let sample_rates = [44100.0, 48000.0, 96000.0];
        let freqs = [20.0, 120.0, 250.0, 750.0, 2000.0, 4000.0, 12000.0, 20000.0];
        let qs = [0.3, 0.7, 1.0, 2.0, 4.0, PASS_Q];
        let gains_db = [-15.0, -6.0, 0.0, 6.0, 15.0];

        for &fs in &sample_rates {
            for shape in SHAPES {
                for &f in &freqs {
                    for &q in &qs {
                        for &g in &gains_db {
                            let c = compute(shape, fs, f, q, db_to_gain(g));
                            assert!(
                                is_stable(&c),
                                "{:?} unstable at fs={} f={} q={} g={}: {:?}",
                                shape, fs, f, q, g, c
                            );
                            assert!(max_pole_magnitude(&c) < 1.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalized_a0() {
        // a0 = 1 shows up as unity DC gain for a low-pass and unity
        // Nyquist gain for a high-pass
        let fs = 48000.0;
        let lp = compute(FilterShape::LowPass, fs, 1000.0, PASS_Q, 1.0);
        let dc = (lp.b0 + lp.b1 + lp.b2) / (1.0 + lp.a1 + lp.a2);
        assert!((dc - 1.0).abs() < 1e-4, "LP DC gain {}", dc);

        let hp = compute(FilterShape::HighPass, fs, 1000.0, PASS_Q, 1.0);
        let nyq = (hp.b0 - hp.b1 + hp.b2) / (1.0 - hp.a1 + hp.a2);
        assert!((nyq - 1.0).abs() < 1e-4, "HP Nyquist gain {}", nyq);
    }

    #[test]
    fn test_zero_db_is_transparent() {
        for shape in [FilterShape::LowShelf, FilterShape::HighShelf, FilterShape::Peaking] {
            let c = compute(shape, 48000.0, 1000.0, 0.7, 1.0);
            for freq in [50.0, 1000.0, 10000.0] {
                let mag = magnitude_at(&c, freq, 48000.0);
                assert!((mag - 1.0).abs() < 1e-4, "{:?} at {}Hz: {}", shape, freq, mag);
            }
        }
    }

    #[test]
    fn test_peaking_gain_at_center() {
        let c = compute(FilterShape::Peaking, 48000.0, 1000.0, 1.0, db_to_gain(9.0));
        let db = to_db(magnitude_at(&c, 1000.0, 48000.0));
        assert!((db - 9.0).abs() < 0.05, "center gain {}dB", db);

        let cut = compute(FilterShape::Peaking, 48000.0, 1000.0, 1.0, db_to_gain(-9.0));
        let db = to_db(magnitude_at(&cut, 1000.0, 48000.0));
        assert!((db + 9.0).abs() < 0.05, "center cut {}dB", db);
    }

    #[test]
    fn test_shelf_plateaus() {
        let fs = 48000.0;
        let ls = compute(FilterShape::LowShelf, fs, 200.0, 0.7, db_to_gain(12.0));
        assert!((to_db(magnitude_at(&ls, 10.0, fs)) - 12.0).abs() < 0.2);
        assert!(to_db(magnitude_at(&ls, 15000.0, fs)).abs() < 0.2);

        let hs = compute(FilterShape::HighShelf, fs, 4000.0, 0.7, db_to_gain(-12.0));
        assert!((to_db(magnitude_at(&hs, 22000.0, fs)) + 12.0).abs() < 0.3);
        assert!(to_db(magnitude_at(&hs, 50.0, fs)).abs() < 0.2);
    }

    #[test]
    fn test_pass_shapes_reject_opposite_band() {
        let fs = 48000.0;
        let hp = compute(FilterShape::HighPass, fs, 400.0, PASS_Q, 1.0);
        assert!(magnitude_at(&hp, 20.0, fs) < 0.01);
        assert!((magnitude_at(&hp, 10000.0, fs) - 1.0).abs() < 0.01);

        let lp = compute(FilterShape::LowPass, fs, 4000.0, PASS_Q, 1.0);
        assert!(magnitude_at(&lp, 20000.0, fs) < 0.1);
        assert!((magnitude_at(&lp, 50.0, fs) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_pass_shapes_ignore_gain() {
        let a = compute(FilterShape::LowPass, 48000.0, 8000.0, PASS_Q, 1.0);
        let b = compute(FilterShape::LowPass, 48000.0, 8000.0, PASS_Q, 5.0);
        assert!(same(&a, &b));
        assert!(!FilterShape::LowPass.uses_gain());
        assert!(FilterShape::Peaking.uses_gain());
    }

    #[test]
    fn test_degenerate_inputs_stay_stable() {
        let cases = [
            (0.0, 0.0, 0.0),
            (-50.0, -1.0, -2.0),
            (f32::NAN, f32::NAN, f32::NAN),
            (1.0e9, 1.0e-9, f32::INFINITY),
        ];
        for shape in SHAPES {
            for &(f, q, g) in &cases {
                let c = compute(shape, 48000.0, f, q, g);
                assert!(c.b0.is_finite() && c.a1.is_finite() && c.a2.is_finite());
                assert!(is_stable(&c), "{:?} f={} q={} g={}", shape, f, q, g);
            }
        }
    }

    #[test]
    fn test_tiny_sample_rates_stay_stable() {
        // 0.49 x fs is below the 10Hz design floor here
        for fs in [1.0, 16.0, 1.0e-30] {
            for shape in SHAPES {
                for f in [0.0, 20.0, 1000.0, 20000.0] {
                    for q in [0.3, 1.0, 4.0, PASS_Q] {
                        for g in [-15.0, 0.0, 15.0] {
                            let c = compute(shape, fs, f, q, db_to_gain(g));
                            assert!(c.b0.is_finite() && c.b1.is_finite() && c.b2.is_finite());
                            assert!(is_stable(&c), "{:?} fs={} f={} q={} g={}", shape, fs, f, q, g);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_matches_cookbook_peaking() {
        // Hand-evaluated cookbook peaking filter, 1kHz / Q 1 / +6dB at 48kHz
        let (fs, f0, q, db) = (48000.0_f64, 1000.0_f64, 1.0_f64, 6.0_f64);
        let a = 10.0_f64.powf(db / 40.0);
        let w = 2.0 * std::f64::consts::PI * f0 / fs;
        let alpha = w.sin() / (2.0 * q);
        let a0 = 1.0 + alpha / a;

        let c = compute(FilterShape::Peaking, 48000.0, 1000.0, 1.0, db_to_gain(6.0));
        assert!((f64::from(c.b0) - (1.0 + alpha * a) / a0).abs() < 1e-5);
        assert!((f64::from(c.a1) - (-2.0 * w.cos()) / a0).abs() < 1e-5);
        assert!((f64::from(c.a2) - (1.0 - alpha / a) / a0).abs() < 1e-5);
    }

    #[test]
    fn test_identity() {
        let c = identity();
        assert!(is_stable(&c));
        assert_eq!(magnitude_at(&c, 1234.0, 48000.0), 1.0);
    }
}
