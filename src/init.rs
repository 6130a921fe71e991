//! Weight initialization.
//!
//! Weights are drawn from a zero-mean Gaussian scaled by the Xavier/Glorot rule
//! `sigma = sqrt(2 / (fan_in + fan_out))`, so signal variance stays roughly
//! constant across stages of different widths. Biases start at zero.

use std::f64::consts::PI;

use rand::Rng;

/// Xavier/Glorot standard deviation for a stage with `fan_in` inputs and `fan_out` outputs.
#[inline]
pub fn xavier_std(fan_in: usize, fan_out: usize) -> f64 {
    (2.0 / (fan_in + fan_out) as f64).sqrt()
}

/// One standard-normal sample via the Box-Muller transform.
///
/// Both uniforms are drawn from `(0, 1]` so `ln(u1)` is always finite.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = 1.0 - rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[inline]
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    standard_normal(rng) * std_dev
}
