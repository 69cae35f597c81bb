//! # Sampling Lattice
//!
//! A layered 2-D integer grid. Faces (walls, ceilings) use one or more
//! depth layers; the volumetric field uses `layers` as its third axis.
//!
//! ## Sweep Order
//!
//! The layer axis is always outermost. Within a layer the order is an
//! explicit [`RasterOrder`], because greedy packing is order-dependent:
//! the same cells swept in a different order yield a different (equally
//! valid) partition.

use serde::{Deserialize, Serialize};

use crate::classifier::DensitySample;

/// Largest lattice a generation pass allocates. Bigger lattices behave as
/// empty.
pub const MAX_CELLS: usize = 1 << 24;

/// Order in which cells of one layer are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterOrder {
    /// Length (`u`) outer, height (`v`) inner. Matches the reference
    /// depth → length → height sweep.
    #[default]
    ColumnMajor,
    /// Height (`v`) outer, length (`u`) inner.
    RowMajor,
}

/// Integer coordinate of one lattice cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatticeCoord {
    /// Position along the length axis.
    pub u: u32,
    /// Position along the height axis.
    pub v: u32,
    /// Depth layer.
    pub layer: u32,
}

impl LatticeCoord {
    /// Creates a new coordinate.
    #[inline]
    #[must_use]
    pub const fn new(u: u32, v: u32, layer: u32) -> Self {
        Self { u, v, layer }
    }
}

/// Bounds of a layered 2-D lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Lattice {
    /// Cells along `u`.
    pub width: u32,
    /// Cells along `v`.
    pub height: u32,
    /// Depth layers.
    pub layers: u32,
}

impl Lattice {
    /// Creates a new lattice.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32, layers: u32) -> Self {
        Self {
            width,
            height,
            layers,
        }
    }

    /// Single-layer lattice.
    #[inline]
    #[must_use]
    pub const fn flat(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// Total number of cells; 0 when the product exceeds [`MAX_CELLS`].
    #[inline]
    #[must_use]
    pub const fn cell_count(self) -> usize {
        match (self.width as usize).checked_mul(self.height as usize) {
            Some(area) => match area.checked_mul(self.layers as usize) {
                Some(cells) if cells <= MAX_CELLS => cells,
                _ => 0,
            },
            None => 0,
        }
    }

    /// True when the lattice holds no cells: an axis has zero extent or
    /// the lattice is oversized.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.cell_count() == 0
    }

    /// True when every axis is non-zero but the cell count exceeds
    /// [`MAX_CELLS`].
    #[inline]
    #[must_use]
    pub const fn is_oversized(self) -> bool {
        self.width != 0 && self.height != 0 && self.layers != 0 && self.is_empty()
    }

    /// True if the coordinate lies inside the lattice.
    #[inline]
    #[must_use]
    pub const fn contains(self, coord: LatticeCoord) -> bool {
        !self.is_empty()
            && coord.u < self.width
            && coord.v < self.height
            && coord.layer < self.layers
    }

    /// Storage index of a coordinate (layer-major, then `v`, then `u`).
    ///
    /// Independent of sweep order so grids built in any order share one
    /// layout.
    #[inline]
    #[must_use]
    pub const fn index(self, coord: LatticeCoord) -> usize {
        (coord.layer as usize * self.height as usize + coord.v as usize) * self.width as usize
            + coord.u as usize
    }

    /// Iterates all cells in sweep order, paired with their sequence index.
    ///
    /// Sequence indices start at 0 and increase by one per visited cell.
    #[must_use]
    pub fn sweep(self, order: RasterOrder) -> Sweep {
        Sweep {
            lattice: self,
            order,
            sequence: 0,
            total: self.cell_count() as u64,
        }
    }
}

/// Iterator returned by [`Lattice::sweep`].
#[derive(Clone, Debug)]
pub struct Sweep {
    lattice: Lattice,
    order: RasterOrder,
    sequence: u64,
    total: u64,
}

impl Iterator for Sweep {
    type Item = (u64, LatticeCoord);

    #[allow(clippy::cast_possible_truncation)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.sequence >= self.total {
            return None;
        }
        let seq = self.sequence;
        self.sequence += 1;

        let per_layer = u64::from(self.lattice.width) * u64::from(self.lattice.height);
        let layer = (seq / per_layer) as u32;
        let within = seq % per_layer;
        let (u, v) = match self.order {
            RasterOrder::ColumnMajor => {
                let h = u64::from(self.lattice.height);
                ((within / h) as u32, (within % h) as u32)
            }
            RasterOrder::RowMajor => {
                let w = u64::from(self.lattice.width);
                ((within % w) as u32, (within / w) as u32)
            }
        };
        Some((seq, LatticeCoord::new(u, v, layer)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.sequence) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep {}

/// Classifier output for every cell of one lattice.
///
/// `None` marks an empty (air) cell.
#[derive(Clone, Debug)]
pub struct DensityGrid {
    lattice: Lattice,
    order: RasterOrder,
    cells: Vec<Option<DensitySample>>,
}

impl DensityGrid {
    /// Creates an all-empty grid.
    #[must_use]
    pub fn empty(lattice: Lattice, order: RasterOrder) -> Self {
        Self {
            lattice,
            order,
            cells: vec![None; lattice.cell_count()],
        }
    }

    /// Bounds of the grid.
    #[inline]
    #[must_use]
    pub const fn lattice(&self) -> Lattice {
        self.lattice
    }

    /// Sweep order the grid was classified in.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> RasterOrder {
        self.order
    }

    /// Sample at a coordinate; `None` for empty or out-of-bounds cells.
    #[inline]
    #[must_use]
    pub fn get(&self, coord: LatticeCoord) -> Option<&DensitySample> {
        if self.lattice.contains(coord) {
            self.cells[self.lattice.index(coord)].as_ref()
        } else {
            None
        }
    }

    /// Stores a sample. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, coord: LatticeCoord, sample: Option<DensitySample>) {
        if self.lattice.contains(coord) {
            let index = self.lattice.index(coord);
            self.cells[index] = sample;
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterates occupied cells in storage order.
    pub fn occupied(&self) -> impl Iterator<Item = (LatticeCoord, &DensitySample)> + '_ {
        let lattice = self.lattice;
        self.lattice
            .sweep(RasterOrder::RowMajor)
            .filter_map(move |(_, coord)| {
                self.cells[lattice.index(coord)]
                    .as_ref()
                    .map(|sample| (coord, sample))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_sweeps_height_innermost() {
        let cells: Vec<_> = Lattice::flat(2, 3)
            .sweep(RasterOrder::ColumnMajor)
            .map(|(_, c)| (c.u, c.v))
            .collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_row_major_sweeps_length_innermost() {
        let cells: Vec<_> = Lattice::flat(2, 2)
            .sweep(RasterOrder::RowMajor)
            .map(|(_, c)| (c.u, c.v))
            .collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_layers_are_outermost() {
        let sweep: Vec<_> = Lattice::new(2, 2, 2).sweep(RasterOrder::ColumnMajor).collect();
        assert_eq!(sweep.len(), 8);
        assert!(sweep[..4].iter().all(|(_, c)| c.layer == 0));
        assert!(sweep[4..].iter().all(|(_, c)| c.layer == 1));
        let sequences: Vec<u64> = sweep.iter().map(|(s, _)| *s).collect();
        assert_eq!(sequences, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_lattice_sweeps_nothing() {
        assert_eq!(Lattice::flat(0, 5).sweep(RasterOrder::ColumnMajor).count(), 0);
        assert_eq!(Lattice::new(3, 3, 0).sweep(RasterOrder::RowMajor).count(), 0);
        assert_eq!(DensityGrid::empty(Lattice::flat(0, 4), RasterOrder::RowMajor).occupied_count(), 0);
    }

    #[test]
    fn test_oversized_lattice_is_empty() {
        let huge = Lattice::new(u32::MAX, u32::MAX, u32::MAX);
        assert!(huge.is_oversized());
        assert!(huge.is_empty());
        assert_eq!(huge.cell_count(), 0);
        assert_eq!(huge.sweep(RasterOrder::ColumnMajor).count(), 0);
        assert!(!huge.contains(LatticeCoord::new(0, 0, 0)));

        let grid = DensityGrid::empty(huge, RasterOrder::ColumnMajor);
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.get(LatticeCoord::new(1, 1, 1)).is_none());

        let just_over = Lattice::new(4097, 4096, 1);
        assert!(just_over.is_oversized());
        let at_limit = Lattice::new(4096, 4096, 1);
        assert_eq!(at_limit.cell_count(), MAX_CELLS);
        assert!(!at_limit.is_oversized());
        assert!(!Lattice::flat(0, 5).is_oversized());
    }

    #[test]
    fn test_index_is_unique() {
        let lattice = Lattice::new(3, 4, 2);
        let mut seen = vec![false; lattice.cell_count()];
        for (_, coord) in lattice.sweep(RasterOrder::ColumnMajor) {
            let i = lattice.index(coord);
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert!(seen.into_iter().all(|s| s));
    }
}
