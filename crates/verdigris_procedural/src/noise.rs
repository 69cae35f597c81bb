//! # Gradient Noise
//!
//! Seeded 3-D gradient noise, the foundation every other stage samples.
//!
//! ## Determinism Guarantee
//!
//! Given the same [`Seed`], this implementation produces **exactly** the
//! same values on any platform: the permutation shuffle is driven by the
//! integer hash in [`crate::hash`], and sampling uses only `floor`,
//! multiplication and addition.

use serde::{Deserialize, Serialize};

use crate::hash::{mix64, CellHash, Channel};

/// Hash stream reserved for the permutation shuffle.
const PERMUTATION_STREAM: u64 = 0x5045_524D;

/// Seed identifying one deterministic noise realization.
///
/// Fixed for the lifetime of a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u64);

impl Seed {
    /// Creates a new seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Lets one structure own several independent noise fields.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        Self(mix64(self.0 ^ mix64(purpose.wrapping_add(1))))
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self(42)
    }
}

/// Seeded permutation of `[0, 256)`, doubled to 512 entries so corner
/// lookups never wrap.
#[derive(Clone)]
struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Fisher-Yates shuffle of the identity permutation.
    #[allow(clippy::cast_possible_truncation)]
    fn new(seed: Seed) -> Self {
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let hash = CellHash::new(seed, PERMUTATION_STREAM);
        for i in (1..256usize).rev() {
            let j = hash.pick(i as u64, Channel::Shuffle, i as u64 + 1) as usize;
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index])
    }
}

/// 3D gradient noise generator.
///
/// Produces smooth, continuous values in `[-1, 1]`.
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
///
/// # Example
///
/// ```rust
/// use verdigris_procedural::{NoiseField, Seed};
///
/// let field = NoiseField::new(Seed::new(42));
/// let value = field.sample(1.25, -3.5, 0.75);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct NoiseField {
    perm_table: PermutationTable,
}

impl NoiseField {
    /// Creates a new noise field from a seed.
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 3D gradient noise at the given position.
    ///
    /// Total over all finite inputs.
    #[must_use]
    #[allow(clippy::many_single_char_names, clippy::similar_names)]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, xf) = lattice_split(x);
        let (yi, yf) = lattice_split(y);
        let (zi, zf) = lattice_split(z);

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm_table;
        let a = p.get(xi) + yi;
        let aa = p.get(a) + zi;
        let ab = p.get(a + 1) + zi;
        let b = p.get(xi + 1) + yi;
        let ba = p.get(b) + zi;
        let bb = p.get(b + 1) + zi;

        let near = lerp(
            lerp(
                grad(p.get(aa), xf, yf, zf),
                grad(p.get(ba), xf - 1.0, yf, zf),
                u,
            ),
            lerp(
                grad(p.get(ab), xf, yf - 1.0, zf),
                grad(p.get(bb), xf - 1.0, yf - 1.0, zf),
                u,
            ),
            v,
        );
        let far = lerp(
            lerp(
                grad(p.get(aa + 1), xf, yf, zf - 1.0),
                grad(p.get(ba + 1), xf - 1.0, yf, zf - 1.0),
                u,
            ),
            lerp(
                grad(p.get(ab + 1), xf, yf - 1.0, zf - 1.0),
                grad(p.get(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
                u,
            ),
            v,
        );

        lerp(near, far, w).clamp(-1.0, 1.0)
    }

    /// Samples noise remapped to `[0, 1]`.
    #[must_use]
    pub fn sample_unit(&self, x: f64, y: f64, z: f64) -> f64 {
        (self.sample(x, y, z) + 1.0) * 0.5
    }
}

/// Splits a coordinate into its wrapped lattice index and fractional part.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lattice_split(t: f64) -> (usize, f64) {
    let floor = t.floor();
    // `as i64` saturates; masking keeps the index inside the table.
    ((floor as i64 & 255) as usize, t - floor)
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of 12 edge gradients selected by the low 4 bits.
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}
