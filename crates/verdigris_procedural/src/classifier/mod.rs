//! # Density Classification
//!
//! Turns noise into a per-cell decision: solid or air, and if solid,
//! which material and which colour variant.
//!
//! Three variants share the [`DensityClassifier`] contract:
//!
//! - [`VolumetricClassifier`]: cave-like 3-D field
//! - [`PanelClassifier`] with [`BandPolicy::Horizontal`]: flat wall panel
//! - [`PanelClassifier`] with [`BandPolicy::Uniform`] / [`BandPolicy::Centered`]:
//!   corridor walls and ceiling
//!
//! Classification is pure per cell: secondary attributes come from the
//! cell's sequence index through [`crate::hash::CellHash`], never from the
//! coordinate alone, so two neighbours with equal noise still diverge.

mod panel;
mod volumetric;

pub use panel::{BandPolicy, PanelClassifier};
pub use volumetric::VolumetricClassifier;

use crate::lattice::{DensityGrid, Lattice, LatticeCoord, RasterOrder};

/// Two-class material tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Material {
    /// Bulk material (teal stone in the reference palette).
    #[default]
    Primary,
    /// Highlight material (gold in the reference palette).
    Accent,
}

/// Colour variant of a block. Each variant belongs to exactly one material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ColorVariant {
    /// Dark teal.
    PrimaryDark = 0,
    /// Mid teal.
    PrimaryMid = 1,
    /// Deep teal.
    PrimaryDeep = 2,
    /// Bright gold.
    AccentBright = 3,
    /// Dark gold.
    AccentDark = 4,
}

impl ColorVariant {
    /// Picks a variant for `material` from a uniform draw in `[0, 1)`.
    ///
    /// Primary splits 40% / 35% / 25%; accent splits evenly.
    #[must_use]
    pub fn pick(material: Material, draw: f64) -> Self {
        match material {
            Material::Primary if draw < 0.4 => Self::PrimaryDark,
            Material::Primary if draw < 0.75 => Self::PrimaryMid,
            Material::Primary => Self::PrimaryDeep,
            Material::Accent if draw > 0.5 => Self::AccentBright,
            Material::Accent => Self::AccentDark,
        }
    }

    /// Material this variant belongs to.
    #[must_use]
    pub const fn material(self) -> Material {
        match self {
            Self::PrimaryDark | Self::PrimaryMid | Self::PrimaryDeep => Material::Primary,
            Self::AccentBright | Self::AccentDark => Material::Accent,
        }
    }

    /// Reference sRGB colour as `0xRRGGBB`.
    #[must_use]
    pub const fn rgb(self) -> u32 {
        match self {
            Self::PrimaryDark => 0x0a_2a_2a,
            Self::PrimaryMid => 0x0d_38_38,
            Self::PrimaryDeep => 0x08_20_20,
            Self::AccentBright => 0xd4_a0_00,
            Self::AccentDark => 0x8a_60_00,
        }
    }
}

/// Result of classifying one solid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensitySample {
    /// Material tag.
    pub material: Material,
    /// Colour variant (always of `material`).
    pub color: ColorVariant,
    /// Size multiplier along the local `u`, `v` and layer axes.
    pub scale: [f64; 3],
    /// Position offset in cell units along the local axes.
    pub jitter: [f64; 3],
    /// Small rotation in radians about the local axes.
    pub tilt: [f64; 3],
}

impl DensitySample {
    /// A sample with no size, position or rotation variation.
    #[must_use]
    pub const fn plain(material: Material, color: ColorVariant) -> Self {
        Self {
            material,
            color,
            scale: [1.0; 3],
            jitter: [0.0; 3],
            tilt: [0.0; 3],
        }
    }
}

/// Per-cell solid/material decision over a lattice.
pub trait DensityClassifier {
    /// Bounds of the lattice this classifier covers.
    fn lattice(&self) -> Lattice;

    /// Classifies one cell. `None` means empty (air).
    ///
    /// `sequence` is the cell's index in the sweep; implementations draw
    /// every pseudo-random attribute from it.
    fn classify(&self, cell: LatticeCoord, sequence: u64) -> Option<DensitySample>;

    /// Classifies every cell, sweeping in `order`.
    fn classify_all(&self, order: RasterOrder) -> DensityGrid {
        let lattice = self.lattice();
        let mut grid = DensityGrid::empty(lattice, order);
        for (sequence, cell) in lattice.sweep(order) {
            grid.set(cell, self.classify(cell, sequence));
        }
        grid
    }
}

/// Hermite smoothstep of `t` clamped to `[0, 1]`.
#[inline]
pub(crate) fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_pick_splits() {
        assert_eq!(ColorVariant::pick(Material::Primary, 0.1), ColorVariant::PrimaryDark);
        assert_eq!(ColorVariant::pick(Material::Primary, 0.5), ColorVariant::PrimaryMid);
        assert_eq!(ColorVariant::pick(Material::Primary, 0.9), ColorVariant::PrimaryDeep);
        assert_eq!(ColorVariant::pick(Material::Accent, 0.7), ColorVariant::AccentBright);
        assert_eq!(ColorVariant::pick(Material::Accent, 0.2), ColorVariant::AccentDark);
    }

    #[test]
    fn test_color_belongs_to_material() {
        for i in 0..100 {
            let draw = f64::from(i) / 100.0;
            for material in [Material::Primary, Material::Accent] {
                assert_eq!(ColorVariant::pick(material, draw).material(), material);
            }
        }
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }
}
