//! # Deterministic Cell Hashing
//!
//! Every pseudo-random decision in generation (permutation shuffle, block
//! size, colour, jitter, notch selection) is drawn from this module.
//! Nothing reads an ambient random source.
//!
//! ## Bit-for-bit definition
//!
//! ```text
//! mix64(x):  x ^= x >> 30; x *= 0xBF58_476D_1CE4_E5B9;
//!            x ^= x >> 27; x *= 0x94D0_49BB_1331_11EB;
//!            x ^= x >> 31
//! key        = mix64(seed ^ mix64(stream))
//! bits(i, c) = mix64(key ^ mix64(i * m(c) ^ (m(c) << 48)))
//! unit(i, c) = (bits(i, c) >> 11) * 2^-53
//! ```
//!
//! All multiplications wrap. `m(c)` is the channel's small odd multiplier.

use crate::noise::Seed;

/// SplitMix64 finalizer.
#[inline]
#[must_use]
pub const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    x
}

/// Purpose of a hash draw.
///
/// Each channel carries a distinct small multiplier so two decisions made
/// for the same cell never share a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Channel {
    /// Fisher-Yates swap index for the permutation table.
    Shuffle = 3,
    /// Candidate block size.
    Size = 5,
    /// Colour variant within a material.
    Color = 7,
    /// Depth variation of a packed block.
    Depth = 11,
    /// Whether a block is decorated with a notch.
    Notch = 13,
    /// Which side of a decorated block is notched.
    NotchSide = 17,
    /// Stochastic boundary thinning.
    Thinning = 19,
    /// Per-axis scale variation.
    ScaleX = 23,
    /// Per-axis scale variation.
    ScaleY = 29,
    /// Per-axis scale variation.
    ScaleZ = 31,
    /// Per-axis position jitter.
    JitterX = 37,
    /// Per-axis position jitter.
    JitterY = 41,
    /// Per-axis position jitter.
    JitterZ = 43,
    /// Per-axis tilt.
    TiltX = 47,
    /// Per-axis tilt.
    TiltY = 53,
    /// Per-axis tilt.
    TiltZ = 59,
}

impl Channel {
    /// Returns the channel's multiplier.
    #[inline]
    #[must_use]
    pub const fn multiplier(self) -> u64 {
        self as u64
    }
}

/// Keyed hash over per-cell sequence indices.
///
/// One instance per packing pass; the `stream` keeps independent passes
/// (e.g. the two corridor walls) from repeating each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellHash {
    key: u64,
}

impl CellHash {
    /// Creates a hash keyed by seed and stream.
    #[inline]
    #[must_use]
    pub const fn new(seed: Seed, stream: u64) -> Self {
        Self {
            key: mix64(seed.value() ^ mix64(stream)),
        }
    }

    /// Raw 64-bit draw for a sequence index.
    #[inline]
    #[must_use]
    pub const fn bits(self, index: u64, channel: Channel) -> u64 {
        let m = channel.multiplier();
        mix64(self.key ^ mix64(index.wrapping_mul(m) ^ (m << 48)))
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn unit(self, index: u64, channel: Channel) -> f64 {
        (self.bits(index, channel) >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `[-1, 1)`.
    #[inline]
    #[must_use]
    pub fn signed(self, index: u64, channel: Channel) -> f64 {
        2.0 * self.unit(index, channel) - 1.0
    }

    /// Integer draw in `[0, n)`. Returns 0 when `n` is 0.
    #[inline]
    #[must_use]
    pub const fn pick(self, index: u64, channel: Channel, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.bits(index, channel) % n
        }
    }
}
