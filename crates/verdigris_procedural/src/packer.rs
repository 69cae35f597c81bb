//! # Greedy Block Packing
//!
//! Converts a classified lattice into non-overlapping rectangular blocks.
//!
//! ## Algorithm
//!
//! For every cell in sweep order:
//!
//! 1. Skip it if empty or already claimed.
//! 2. Pick a candidate size from the weighted [`SizeTable`] using the
//!    cell's sequence index.
//! 3. If the candidate overruns the lattice bounds, or any footprint cell
//!    is claimed, empty, or of another material, fall back to 1x1 (always
//!    available: the current cell is free).
//! 4. Claim the footprint and emit one [`FaceBlock`].
//!
//! The result depends on the sweep order. For a fixed order and seed it
//! is bit-identical across runs, and always covers every solid cell
//! exactly once.

use serde::{Deserialize, Serialize};

use crate::classifier::DensitySample;
use crate::hash::{CellHash, Channel};
use crate::lattice::{DensityGrid, Lattice, LatticeCoord};

/// A candidate block footprint with its selection weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSize {
    /// Cells along `u`.
    pub width: u32,
    /// Cells along `v`.
    pub height: u32,
    /// Relative selection weight.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

const fn default_weight() -> u32 {
    1
}

impl BlockSize {
    /// Single cell with weight 1.
    pub const UNIT: Self = Self::new(1, 1);

    /// Creates a size with weight 1.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            weight: 1,
        }
    }

    /// Same footprint with a different weight.
    #[inline]
    #[must_use]
    pub const fn with_weight(self, weight: u32) -> Self {
        Self { weight, ..self }
    }
}

/// Weighted table of candidate block sizes.
///
/// The default favours single cells: three 1x1 entries against one each
/// of 2x1, 1x2, 2x2, 3x1 and 3x2. An empty table packs 1x1 only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeTable {
    entries: Vec<BlockSize>,
}

impl SizeTable {
    /// Creates a table from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<BlockSize>) -> Self {
        Self { entries }
    }

    /// A table holding only 1x1.
    #[must_use]
    pub fn single() -> Self {
        Self::new(vec![BlockSize::UNIT])
    }

    /// Table entries.
    #[must_use]
    pub fn entries(&self) -> &[BlockSize] {
        &self.entries
    }

    /// Sum of all entry weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Largest width and height of any entry (at least 1x1).
    #[must_use]
    pub fn max_extent(&self) -> (u32, u32) {
        self.entries
            .iter()
            .fold((1, 1), |(w, h), e| (w.max(e.width), h.max(e.height)))
    }

    /// Candidate size for the cell at `sequence`.
    ///
    /// Draws `r = pick(sequence, Size, total)` and returns the first entry
    /// whose cumulative weight exceeds `r`.
    #[must_use]
    pub fn pick(&self, hash: CellHash, sequence: u64) -> BlockSize {
        let total = self.total_weight();
        if total == 0 {
            return BlockSize::UNIT;
        }
        let mut r = hash.pick(sequence, Channel::Size, total);
        for entry in &self.entries {
            let weight = u64::from(entry.weight);
            if r < weight {
                return *entry;
            }
            r -= weight;
        }
        BlockSize::UNIT
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::new(vec![
            BlockSize::UNIT,
            BlockSize::UNIT,
            BlockSize::UNIT,
            BlockSize::new(2, 1),
            BlockSize::new(1, 2),
            BlockSize::new(2, 2),
            BlockSize::new(3, 1),
            BlockSize::new(3, 2),
        ])
    }
}

/// Cells claimed by blocks during one packing pass.
///
/// Dense bitmap over the pass's lattice. Claims are write-once.
#[derive(Clone, Debug)]
pub struct OccupancySet {
    lattice: Lattice,
    bits: Vec<u64>,
    claimed: usize,
}

impl OccupancySet {
    /// Creates an empty set covering `lattice`.
    #[must_use]
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            bits: vec![0; lattice.cell_count().div_ceil(64)],
            claimed: 0,
        }
    }

    /// True if the cell is claimed. Out-of-bounds cells count as claimed.
    #[inline]
    #[must_use]
    pub fn is_claimed(&self, cell: LatticeCoord) -> bool {
        if !self.lattice.contains(cell) {
            return true;
        }
        let index = self.lattice.index(cell);
        self.bits[index / 64] & (1 << (index % 64)) != 0
    }

    /// Claims a cell. Returns `false` if it was already claimed or lies
    /// outside the lattice.
    #[inline]
    pub fn claim(&mut self, cell: LatticeCoord) -> bool {
        if self.is_claimed(cell) {
            return false;
        }
        let index = self.lattice.index(cell);
        self.bits[index / 64] |= 1 << (index % 64);
        self.claimed += 1;
        true
    }

    /// Number of claimed cells.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.claimed
    }

    /// True if nothing has been claimed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.claimed == 0
    }
}

/// One packed block in lattice space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBlock {
    /// Lowest-`u`, lowest-`v` cell of the footprint.
    pub origin: LatticeCoord,
    /// Footprint width in cells.
    pub width: u32,
    /// Footprint height in cells.
    pub height: u32,
    /// Sequence index of the origin cell.
    pub sequence: u64,
    /// Classifier output of the origin cell.
    pub sample: DensitySample,
}

impl FaceBlock {
    /// Iterates the cells of the footprint.
    pub fn cells(&self) -> impl Iterator<Item = LatticeCoord> + '_ {
        let o = self.origin;
        (0..self.width).flat_map(move |du| {
            (0..self.height).map(move |dv| LatticeCoord::new(o.u + du, o.v + dv, o.layer))
        })
    }

    /// Number of cells covered.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// One greedy packing pass over a classified grid.
///
/// Owns its [`OccupancySet`]; nothing else can observe or share it.
pub struct PackingPass<'a> {
    grid: &'a DensityGrid,
    sizes: &'a SizeTable,
    hash: CellHash,
    occupancy: OccupancySet,
}

impl<'a> PackingPass<'a> {
    /// Prepares a pass. `hash` must be the stream the grid was classified
    /// with, so a block's size and attributes share one sequence index.
    #[must_use]
    pub fn new(grid: &'a DensityGrid, sizes: &'a SizeTable, hash: CellHash) -> Self {
        Self {
            grid,
            sizes,
            hash,
            occupancy: OccupancySet::new(grid.lattice()),
        }
    }

    /// Runs the pass, returning blocks in emission order.
    #[must_use]
    pub fn run(mut self) -> Vec<FaceBlock> {
        let lattice = self.grid.lattice();
        let mut blocks = Vec::new();

        for (sequence, cell) in lattice.sweep(self.grid.order()) {
            if self.occupancy.is_claimed(cell) {
                continue;
            }
            let Some(sample) = self.grid.get(cell).copied() else {
                continue;
            };

            let candidate = self.sizes.pick(self.hash, sequence);
            let mut block = FaceBlock {
                origin: cell,
                width: candidate.width,
                height: candidate.height,
                sequence,
                sample,
            };
            if !Self::fits(lattice, &block) || !self.footprint_available(&block) {
                block.width = 1;
                block.height = 1;
            }

            for covered in block.cells() {
                self.occupancy.claim(covered);
            }
            blocks.push(block);
        }

        tracing::debug!(
            "Packed {} cells into {} blocks ({}x{}x{})",
            self.occupancy.len(),
            blocks.len(),
            lattice.width,
            lattice.height,
            lattice.layers
        );
        blocks
    }

    fn fits(lattice: Lattice, block: &FaceBlock) -> bool {
        block.width >= 1
            && block.height >= 1
            && block.width <= lattice.width - block.origin.u
            && block.height <= lattice.height - block.origin.v
    }

    fn footprint_available(&self, block: &FaceBlock) -> bool {
        block.cells().all(|cell| {
            !self.occupancy.is_claimed(cell)
                && self
                    .grid
                    .get(cell)
                    .is_some_and(|s| s.material == block.sample.material)
        })
    }
}

/// Packs `grid` in one pass.
#[must_use]
pub fn pack(grid: &DensityGrid, sizes: &SizeTable, hash: CellHash) -> Vec<FaceBlock> {
    PackingPass::new(grid, sizes, hash).run()
}
