//! Frequency Response Evaluation
//!
//! Evaluates |H(e^jw)| of a biquad (or a cascade of them) at a given frequency.
//! Used for drawing EQ curves and for verifying band behavior in tests.
//! Never called on the audio thread.

use std::f64::consts::PI;

use biquad::Coefficients;

/// Magnitude (linear) of a single biquad at `frequency` Hz
pub fn magnitude_at(coeffs: &Coefficients<f32>, frequency: f32, sample_rate: f32) -> f32 {
    let w = 2.0 * PI * f64::from(frequency) / f64::from(sample_rate);
    let (s1, c1) = w.sin_cos();
    let (s2, c2) = (2.0 * w).sin_cos();

    let (b0, b1, b2) = (
        f64::from(coeffs.b0),
        f64::from(coeffs.b1),
        f64::from(coeffs.b2),
    );
    let (a1, a2) = (f64::from(coeffs.a1), f64::from(coeffs.a2));

    // H(z) evaluated at z = e^jw, with e^-jkw = cos(kw) - j sin(kw)
    let num_re = b0 + b1 * c1 + b2 * c2;
    let num_im = -(b1 * s1 + b2 * s2);
    let den_re = 1.0 + a1 * c1 + a2 * c2;
    let den_im = -(a1 * s1 + a2 * s2);

    (num_re.hypot(num_im) / den_re.hypot(den_im)) as f32
}

/// Magnitude in dB of a single biquad at `frequency` Hz
pub fn magnitude_db_at(coeffs: &Coefficients<f32>, frequency: f32, sample_rate: f32) -> f32 {
    20.0 * magnitude_at(coeffs, frequency, sample_rate).log10()
}

/// Combined magnitude in dB of a cascade (sum of each stage's dB response)
pub fn cascade_magnitude_db<'a, I>(stages: I, frequency: f32, sample_rate: f32) -> f32
where
    I: IntoIterator<Item = &'a Coefficients<f32>>,
{
    stages
        .into_iter()
        .map(|c| magnitude_db_at(c, frequency, sample_rate))
        .sum()
}
