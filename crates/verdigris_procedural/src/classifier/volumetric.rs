//! Volumetric cave-like classification.
//!
//! ## Density
//!
//! ```text
//! w        = domain_warp(p * frequency)
//! density  = ridged  * (ridged_noise(w) - 0.85)
//!          + pillar  *  fbm(w * (0.6, 0.2, 0.6), 3)
//!          + vertical * (exp(-|y| / half_height * k) - 0.5)
//!          + cave    *  fbm(w * 1.8 + offset, 4)
//! ```
//!
//! A cell is solid when `density >= threshold`, where the threshold is
//! raised by `clearance` inside the central tunnel. Near the ellipsoidal
//! boundary, solid cells are dropped at random (by cell hash) with a
//! probability rising smoothly to 1, so the silhouette has no hard edge.

use super::{smoothstep, ColorVariant, DensityClassifier, DensitySample, Material};
use crate::config::VolumetricConfig;
use crate::fractal::{domain_warp, fbm, ridged_noise};
use crate::hash::{CellHash, Channel};
use crate::lattice::{Lattice, LatticeCoord};
use crate::noise::NoiseField;

/// Centring bias of the ridged term (its mean is close to this).
const RIDGE_BIAS: f64 = 0.85;

/// Centring bias of the vertical falloff term.
const VERTICAL_BIAS: f64 = 0.5;

/// Ellipsoid weights of the boundary distance, per axis.
const ELLIPSOID: [f64; 3] = [0.3, 0.5, 0.2];

/// Hash stream of the volumetric pass.
pub(crate) const VOLUMETRIC_STREAM: u64 = 0x564F_4C55;

const SCALE_CHANNELS: [Channel; 3] = [Channel::ScaleX, Channel::ScaleY, Channel::ScaleZ];
const JITTER_CHANNELS: [Channel; 3] = [Channel::JitterX, Channel::JitterY, Channel::JitterZ];
const TILT_CHANNELS: [Channel; 3] = [Channel::TiltX, Channel::TiltY, Channel::TiltZ];

/// Classifier for the cave-like volume.
///
/// Lattice axes map `u → x`, `v → y`, `layer → z`.
pub struct VolumetricClassifier {
    config: VolumetricConfig,
    lattice: Lattice,
    field: NoiseField,
    hash: CellHash,
}

impl VolumetricClassifier {
    /// Creates a classifier for `config`.
    #[must_use]
    pub fn new(config: &VolumetricConfig) -> Self {
        Self {
            config: config.clone(),
            lattice: config.lattice(),
            field: NoiseField::new(config.seed),
            hash: CellHash::new(config.seed, VOLUMETRIC_STREAM),
        }
    }

    /// Keyed hash shared with the packing pass.
    #[must_use]
    pub const fn hash(&self) -> CellHash {
        self.hash
    }

    /// World position of a cell centre.
    #[must_use]
    pub fn position(&self, cell: LatticeCoord) -> [f64; 3] {
        let index = [cell.u, cell.v, cell.layer];
        std::array::from_fn(|axis| {
            -self.config.bounds[axis] * 0.5 + f64::from(index[axis]) * self.config.unit_size
        })
    }

    /// Normalised ellipsoidal distance; cells beyond 1.0 are outside.
    #[must_use]
    pub fn radial(&self, p: [f64; 3]) -> f64 {
        let mean_extent = self.config.bounds.iter().sum::<f64>() / 3.0;
        let reach = self.config.boundary * mean_extent;
        if reach <= 0.0 {
            return f64::INFINITY;
        }
        let d2: f64 = ELLIPSOID.iter().zip(p).map(|(k, x)| k * x * x).sum();
        d2.sqrt() / reach
    }

    /// Scalar density at a world position.
    #[must_use]
    pub fn density(&self, p: [f64; 3]) -> f64 {
        let c = &self.config;
        let f = &self.field;
        let [wx, wy, wz] = domain_warp(
            f,
            p[0] * c.frequency,
            p[1] * c.frequency,
            p[2] * c.frequency,
            c.warp_strength,
        );

        let ridged = ridged_noise(f, wx, wy, wz);
        let pillar = fbm(f, wx * 0.6, wy * 0.2, wz * 0.6, 3);
        let half_height = (c.bounds[1] * 0.5).max(f64::EPSILON);
        let vertical = (-(p[1].abs() / half_height) * c.vertical_falloff).exp();
        let cave = fbm(f, wx * 1.8 + 31.7, wy * 1.8, wz * 1.8, 4);

        c.weights.ridged * (ridged - RIDGE_BIAS)
            + c.weights.pillar * pillar
            + c.weights.vertical * (vertical - VERTICAL_BIAS)
            + c.weights.cave * cave
    }

    /// Solidity threshold at a world position (raised inside the tunnel).
    #[must_use]
    pub fn threshold(&self, p: [f64; 3]) -> f64 {
        let c = &self.config;
        let mask = &c.corridor;
        if mask.radius <= 0.0 {
            return c.thresholds.base;
        }
        let wobble = fbm(&self.field, 7.3, p[1] * 0.04, -4.1, 2);
        let radius = mask.radius * (1.0 + mask.variation * wobble);
        let dy = p[1] - mask.center_y;
        if (p[0] * p[0] + dy * dy).sqrt() < radius {
            c.thresholds.base + mask.clearance
        } else {
            c.thresholds.base
        }
    }

    /// Material of a solid cell at a world position.
    #[must_use]
    pub fn material(&self, p: [f64; 3]) -> Material {
        let f = &self.field;
        let primary = f.sample(p[0] * 0.06 + 100.0, p[1] * 0.08, p[2] * 0.06);
        if primary > self.config.thresholds.accent {
            return Material::Accent;
        }
        let secondary = f.sample(p[0] * 0.11 - 23.0, p[1] * 0.11 + 57.0, p[2] * 0.11);
        if p[1] > 0.0 && secondary > self.config.secondary_accent {
            Material::Accent
        } else {
            Material::Primary
        }
    }

    /// Drops cells near the boundary at random.
    fn thinned(&self, radial: f64, sequence: u64) -> bool {
        let start = self.config.thinning_start;
        if radial <= start {
            return false;
        }
        let span = (1.0 - start).max(f64::EPSILON);
        let drop = smoothstep((radial - start) / span);
        self.hash.unit(sequence, Channel::Thinning) < drop
    }
}

impl DensityClassifier for VolumetricClassifier {
    fn lattice(&self) -> Lattice {
        self.lattice
    }

    fn classify(&self, cell: LatticeCoord, sequence: u64) -> Option<DensitySample> {
        if !self.lattice.contains(cell) {
            return None;
        }
        let p = self.position(cell);
        let radial = self.radial(p);
        if radial > 1.0 {
            return None;
        }
        if self.density(p) < self.threshold(p) {
            return None;
        }
        if self.thinned(radial, sequence) {
            return None;
        }

        let c = &self.config;
        let h = self.hash;
        let material = self.material(p);
        let color = ColorVariant::pick(material, h.unit(sequence, Channel::Color));
        let variation = 0.5 + self.field.sample(p[0] * 0.3, p[1] * 0.3, p[2] * 0.3).abs() * 1.8;
        let tilt = match material {
            Material::Primary => c.primary_tilt,
            Material::Accent => c.accent_tilt,
        };

        Some(DensitySample {
            scale: SCALE_CHANNELS
                .map(|channel| variation * (1.0 + c.scale_jitter * h.signed(sequence, channel))),
            jitter: JITTER_CHANNELS.map(|channel| c.position_jitter * h.signed(sequence, channel)),
            tilt: TILT_CHANNELS.map(|channel| tilt * h.signed(sequence, channel)),
            ..DensitySample::plain(material, color)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::RasterOrder;
    use crate::noise::Seed;

    fn small_config() -> VolumetricConfig {
        VolumetricConfig {
            seed: Seed::new(42),
            bounds: [48.0; 3],
            ..VolumetricConfig::default()
        }
    }

    #[test]
    fn test_reference_lattice_size() {
        let classifier = VolumetricClassifier::new(&VolumetricConfig::default());
        assert_eq!(classifier.lattice(), Lattice::new(34, 34, 34));
        assert_eq!(classifier.position(LatticeCoord::new(0, 0, 0)), [-50.0; 3]);
        assert_eq!(classifier.position(LatticeCoord::new(33, 0, 0))[0], 49.0);
    }

    #[test]
    fn test_degenerate_bounds_are_empty() {
        let config = VolumetricConfig {
            bounds: [0.0, 100.0, 100.0],
            ..VolumetricConfig::default()
        };
        let classifier = VolumetricClassifier::new(&config);
        assert!(classifier.lattice().is_empty());
        assert_eq!(classifier.classify_all(RasterOrder::ColumnMajor).occupied_count(), 0);

        let nan = VolumetricConfig {
            bounds: [f64::NAN, 100.0, 100.0],
            ..VolumetricConfig::default()
        };
        assert!(nan.lattice().is_empty());
    }

    #[test]
    fn test_oversized_bounds_classify_nothing() {
        let config = VolumetricConfig {
            bounds: [1.0e300; 3],
            ..VolumetricConfig::default()
        };
        let classifier = VolumetricClassifier::new(&config);
        assert!(classifier.lattice().is_oversized());
        assert_eq!(classifier.classify_all(RasterOrder::ColumnMajor).occupied_count(), 0);
    }

    #[test]
    fn test_some_but_not_all_cells_solid() {
        let classifier = VolumetricClassifier::new(&small_config());
        let grid = classifier.classify_all(RasterOrder::ColumnMajor);
        let solid = grid.occupied_count();
        assert!(solid > 0, "volume should not be empty");
        assert!(solid < classifier.lattice().cell_count(), "volume should not be full");
    }

    #[test]
    fn test_cells_outside_boundary_are_empty() {
        let classifier = VolumetricClassifier::new(&small_config());
        let grid = classifier.classify_all(RasterOrder::ColumnMajor);
        for (cell, _) in grid.occupied() {
            assert!(classifier.radial(classifier.position(cell)) <= 1.0);
        }
    }

    #[test]
    fn test_classification_is_pure() {
        let a = VolumetricClassifier::new(&small_config());
        let b = VolumetricClassifier::new(&small_config());
        for (sequence, cell) in a.lattice().sweep(RasterOrder::ColumnMajor).step_by(7) {
            assert_eq!(a.classify(cell, sequence), b.classify(cell, sequence));
        }
    }

    #[test]
    fn test_tunnel_raises_threshold() {
        let classifier = VolumetricClassifier::new(&VolumetricConfig::default());
        let base = VolumetricConfig::default().thresholds.base;
        let inside = classifier.threshold([0.0, 5.0, 0.0]);
        let outside = classifier.threshold([45.0, -40.0, 0.0]);
        assert!(inside > base);
        assert_eq!(outside, base);
    }

    #[test]
    fn test_attributes_within_configured_ranges() {
        let config = small_config();
        let classifier = VolumetricClassifier::new(&config);
        let grid = classifier.classify_all(RasterOrder::ColumnMajor);
        for (_, s) in grid.occupied() {
            assert_eq!(s.color.material(), s.material);
            for scale in s.scale {
                assert!((0.5 * 0.7 - 1e-9..=2.3 * 1.3 + 1e-9).contains(&scale));
            }
            assert!(s.jitter.iter().all(|j| j.abs() <= config.position_jitter));
            let max_tilt = config.primary_tilt.max(config.accent_tilt);
            assert!(s.tilt.iter().all(|t| t.abs() <= max_tilt));
        }
    }
}
