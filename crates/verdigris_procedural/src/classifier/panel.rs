//! Flat panel classification (wall panels and corridor faces).
//!
//! Every cell of a panel is solid; the interesting decisions are the
//! material zone and the per-cell depth and colour variation. Block sizes
//! are chosen later by the packer.

use serde::{Deserialize, Serialize};

use super::{ColorVariant, DensityClassifier, DensitySample, Material};
use crate::hash::{CellHash, Channel};
use crate::lattice::{Lattice, LatticeCoord};
use crate::noise::NoiseField;

/// Where a panel places accent material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandPolicy {
    /// Primary everywhere.
    #[default]
    Uniform,
    /// Horizontal band between two heights with noise-jittered edges.
    ///
    /// `lower`, `upper` and `jitter` are fractions of the panel height.
    Horizontal {
        /// Lower edge.
        lower: f64,
        /// Upper edge.
        upper: f64,
        /// Maximum edge displacement.
        jitter: f64,
        /// Noise frequency along the panel length, per cell.
        frequency: f64,
    },
    /// Band centred across the panel's `v` axis.
    ///
    /// `half_width` and `jitter` are fractions of the `v` extent.
    Centered {
        /// Half the band width.
        half_width: f64,
        /// Maximum edge displacement.
        jitter: f64,
        /// Noise frequency along the panel length, per cell.
        frequency: f64,
    },
}

impl BandPolicy {
    /// Default horizontal wall band.
    #[must_use]
    pub const fn horizontal() -> Self {
        Self::Horizontal {
            lower: 0.35,
            upper: 0.55,
            jitter: 0.06,
            frequency: 0.15,
        }
    }

    /// Default centred ceiling band.
    #[must_use]
    pub const fn centered() -> Self {
        Self::Centered {
            half_width: 0.17,
            jitter: 0.05,
            frequency: 0.12,
        }
    }
}

/// Classifier for one flat face.
pub struct PanelClassifier {
    lattice: Lattice,
    policy: BandPolicy,
    depth_jitter: f64,
    field: NoiseField,
    hash: CellHash,
}

impl PanelClassifier {
    /// Creates a panel classifier.
    ///
    /// `hash` must be the same keyed hash the packing pass uses, so a
    /// block's attributes and its size come from one stream.
    #[must_use]
    pub fn new(
        lattice: Lattice,
        policy: BandPolicy,
        depth_jitter: f64,
        field: NoiseField,
        hash: CellHash,
    ) -> Self {
        Self {
            lattice,
            policy,
            depth_jitter,
            field,
            hash,
        }
    }

    /// Material zone of a cell.
    #[must_use]
    pub fn material(&self, cell: LatticeCoord) -> Material {
        let extent = f64::from(self.lattice.height);
        let along = f64::from(cell.u);
        let layer = f64::from(cell.layer);
        let centre = f64::from(cell.v) + 0.5;

        let accent = match self.policy {
            BandPolicy::Uniform => false,
            BandPolicy::Horizontal {
                lower,
                upper,
                jitter,
                frequency,
            } => {
                let lo_shift = self.field.sample(along * frequency + 0.31, 11.7, layer * 0.5);
                let hi_shift = self.field.sample(along * frequency + 0.73, 23.9, layer * 0.5);
                let lo = (lower + jitter * lo_shift) * extent;
                let hi = (upper + jitter * hi_shift) * extent;
                centre >= lo && centre < hi
            }
            BandPolicy::Centered {
                half_width,
                jitter,
                frequency,
            } => {
                let shift = self.field.sample(along * frequency + 0.47, 5.3, layer * 0.5);
                let half = (half_width + jitter * shift) * extent;
                (centre - extent * 0.5).abs() < half
            }
        };

        if accent {
            Material::Accent
        } else {
            Material::Primary
        }
    }
}

impl DensityClassifier for PanelClassifier {
    fn lattice(&self) -> Lattice {
        self.lattice
    }

    fn classify(&self, cell: LatticeCoord, sequence: u64) -> Option<DensitySample> {
        if !self.lattice.contains(cell) {
            return None;
        }
        let material = self.material(cell);
        let color = ColorVariant::pick(material, self.hash.unit(sequence, Channel::Color));
        let mut sample = DensitySample::plain(material, color);
        sample.scale[2] = 1.0 + self.depth_jitter * self.hash.signed(sequence, Channel::Depth);
        Some(sample)
    }
}
