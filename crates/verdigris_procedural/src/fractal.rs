//! # Fractal Combinators
//!
//! Stateless layers over a [`NoiseField`]: fractal Brownian motion,
//! domain warping and ridged noise. None of these hold state or fail.

use crate::noise::NoiseField;

/// Octaves used by each axis of [`domain_warp`].
const WARP_OCTAVES: u32 = 3;

/// Octaves folded by [`ridged_noise`].
const RIDGED_OCTAVES: u32 = 5;

/// Per-axis sample offsets decorrelating the three warp channels.
const WARP_OFFSETS: [[f64; 3]; 3] = [
    [0.0, 0.0, 0.0],
    [5.2, 1.3, -3.7],
    [-8.1, 2.9, 4.4],
];

/// Fractal Brownian motion.
///
/// Sums `octaves` layers, amplitude halving and frequency doubling each
/// layer, normalised by the total amplitude so the result stays in
/// `[-1, 1]`. Zero octaves yield `0.0`.
#[must_use]
pub fn fbm(field: &NoiseField, x: f64, y: f64, z: f64, octaves: u32) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..octaves {
        total += amplitude * field.sample(x * frequency, y * frequency, z * frequency);
        max_amplitude += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    if max_amplitude > 0.0 {
        total / max_amplitude
    } else {
        0.0
    }
}

/// Warps a position by three decorrelated fbm samples.
///
/// Returns the displaced position, each axis moved by at most `strength`.
#[must_use]
pub fn domain_warp(field: &NoiseField, x: f64, y: f64, z: f64, strength: f64) -> [f64; 3] {
    let mut warped = [x, y, z];
    for (axis, offset) in WARP_OFFSETS.iter().enumerate() {
        let displacement = fbm(
            field,
            x + offset[0],
            y + offset[1],
            z + offset[2],
            WARP_OCTAVES,
        );
        warped[axis] += displacement * strength;
    }
    warped
}

/// Ridged noise: `1 - |fbm|`, sharp creases where the noise crosses zero.
///
/// Range `[0, 1]`.
#[must_use]
pub fn ridged_noise(field: &NoiseField, x: f64, y: f64, z: f64) -> f64 {
    1.0 - fbm(field, x, y, z, RIDGED_OCTAVES).abs()
}
