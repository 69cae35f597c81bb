//! # Structure Assembly
//!
//! Runs the full pipeline for one structure: classify, pack, place in
//! world space, and pick decorative notches.
//!
//! ```text
//! StructureConfig ─► DensityClassifier ─► DensityGrid ─► PackingPass
//!                                                           │
//!            Structure { primary, accent, notches } ◄── FaceFrame
//! ```
//!
//! Generation is total: degenerate configurations produce an empty
//! [`Structure`], never an error.

use verdigris_shared::Vec3;

use crate::classifier::{
    BandPolicy, ColorVariant, DensityClassifier, Material, PanelClassifier, VolumetricClassifier,
};
use crate::config::{CorridorConfig, NotchConfig, StructureConfig, VolumetricConfig, WallConfig};
use crate::hash::{CellHash, Channel};
use crate::lattice::{Lattice, LatticeCoord, RasterOrder, MAX_CELLS};
use crate::noise::{NoiseField, Seed};
use crate::notch::{clamp_notch_radius, Mesh, NotchProfileBuilder, NotchSide};
use crate::packer::{pack, FaceBlock, SizeTable};

/// Hash stream of the wall panel.
const WALL_STREAM: u64 = 0x5741_4C4C;

/// Hash streams of the corridor faces: left wall, right wall, ceiling.
const CORRIDOR_STREAMS: [u64; 3] = [0x434C_5746, 0x4352_5746, 0x4343_454C];

/// Maps lattice coordinates of one face to world space.
///
/// Lattice axis `i` runs along world axis `axes[i]`, one cell spanning
/// `steps[i]` world units, starting at `origin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceFrame {
    /// World position of the lattice's minimum corner.
    pub origin: [f64; 3],
    /// World axis (0 = x, 1 = y, 2 = z) of `u`, `v` and `layer`.
    pub axes: [usize; 3],
    /// Cell size along `u`, `v` and `layer`.
    pub steps: [f64; 3],
}

impl FaceFrame {
    /// Frame whose lattice axes are the world axes.
    #[must_use]
    pub const fn aligned(origin: [f64; 3], steps: [f64; 3]) -> Self {
        Self {
            origin,
            axes: [0, 1, 2],
            steps,
        }
    }

    /// World position of a point given in (fractional) lattice units.
    #[must_use]
    pub fn world(&self, local: [f64; 3]) -> [f64; 3] {
        let mut world = self.origin;
        for (i, &axis) in self.axes.iter().enumerate() {
            world[axis] += local[i] * self.steps[i];
        }
        world
    }

    /// Reorders a per-lattice-axis vector into world axes.
    #[must_use]
    pub fn to_world_axes(&self, local: [f64; 3]) -> [f64; 3] {
        let mut world = [0.0; 3];
        for (i, &axis) in self.axes.iter().enumerate() {
            world[axis] = local[i];
        }
        world
    }
}

/// A placed block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedBlock {
    /// Origin cell in its face lattice.
    pub origin: LatticeCoord,
    /// Cells covered along `u`, `v` and `layer`.
    pub extent: [u32; 3],
    /// Material tag.
    pub material: Material,
    /// Colour variant.
    pub color: ColorVariant,
    /// World-space centre.
    pub position: Vec3,
    /// World-space size per axis.
    pub size: Vec3,
    /// Rotation in radians about the world axes.
    pub rotation: Vec3,
    /// Sequence index of the origin cell.
    pub sequence: u64,
}

/// A block selected for notch decoration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotchDescriptor {
    /// Material list holding the block.
    pub material: Material,
    /// Index into that list.
    pub block: usize,
    /// Notched side.
    pub side: NotchSide,
    /// Notch radius, already clamped to the face.
    pub radius: f64,
    /// Face width (along the face's `u`).
    pub width: f64,
    /// Face height (along the face's `v`).
    pub height: f64,
    /// Block depth (along the face's layer axis).
    pub depth: f64,
}

impl NotchDescriptor {
    /// Builds the decorated mesh for this block.
    #[must_use]
    pub fn mesh(&self, builder: &NotchProfileBuilder) -> Mesh {
        builder.build(self.width, self.height, self.depth, self.side, self.radius)
    }
}

/// Generated blocks, split by material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Structure {
    /// Primary-material blocks.
    pub primary: Vec<PackedBlock>,
    /// Accent-material blocks.
    pub accent: Vec<PackedBlock>,
    /// Blocks chosen for notch decoration.
    pub notches: Vec<NotchDescriptor>,
}

impl Structure {
    /// Total number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.primary.len() + self.accent.len()
    }

    /// True if no block was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block_count() == 0
    }

    /// All blocks, primary first.
    pub fn blocks(&self) -> impl Iterator<Item = &PackedBlock> {
        self.primary.iter().chain(self.accent.iter())
    }

    /// Blocks of one material.
    #[must_use]
    pub fn of(&self, material: Material) -> &[PackedBlock] {
        match material {
            Material::Primary => &self.primary,
            Material::Accent => &self.accent,
        }
    }

    /// The block a notch descriptor decorates.
    #[must_use]
    pub fn notched_block(&self, notch: &NotchDescriptor) -> Option<&PackedBlock> {
        self.of(notch.material).get(notch.block)
    }

    /// Places the packed blocks of one face.
    fn place_face(
        &mut self,
        blocks: &[FaceBlock],
        frame: &FaceFrame,
        gap: f64,
        notch: &NotchConfig,
        hash: CellHash,
    ) {
        for block in blocks {
            let sample = &block.sample;
            let extent = [block.width, block.height, 1];
            let centre = [
                f64::from(block.origin.u) + f64::from(block.width) * 0.5 + sample.jitter[0],
                f64::from(block.origin.v) + f64::from(block.height) * 0.5 + sample.jitter[1],
                f64::from(block.origin.layer) + 0.5 + sample.jitter[2],
            ];

            let local_size: [f64; 3] = std::array::from_fn(|axis| {
                let raw = f64::from(extent[axis]) * frame.steps[axis].abs() * sample.scale[axis];
                if axis < 2 {
                    (raw - gap).max(0.0)
                } else {
                    raw
                }
            });

            let placed = PackedBlock {
                origin: block.origin,
                extent,
                material: sample.material,
                color: sample.color,
                position: Vec3::from_f64(frame.world(centre)),
                size: Vec3::from_f64(frame.to_world_axes(local_size)),
                rotation: Vec3::from_f64(frame.to_world_axes(sample.tilt)),
                sequence: block.sequence,
            };

            let list = match placed.material {
                Material::Primary => &mut self.primary,
                Material::Accent => &mut self.accent,
            };
            list.push(placed);
            let index = list.len() - 1;

            if hash.unit(block.sequence, Channel::Notch) < notch.probability {
                let side = NotchSide::from_index(hash.pick(block.sequence, Channel::NotchSide, 4));
                let [width, height, depth] = local_size;
                self.notches.push(NotchDescriptor {
                    material: placed.material,
                    block: index,
                    side,
                    radius: clamp_notch_radius(width, height, notch.radius),
                    width,
                    height,
                    depth,
                });
            }
        }
    }

    fn log_summary(&self, kind: &str, seed: Seed) {
        tracing::info!(
            "Generated {} structure (seed {}): {} primary, {} accent, {} notched",
            kind,
            seed.value(),
            self.primary.len(),
            self.accent.len(),
            self.notches.len()
        );
    }
}

fn warn_if_oversized(kind: &str, lattice: Lattice) {
    if lattice.is_oversized() {
        tracing::warn!(
            "{} lattice {}x{}x{} exceeds {} cells, generating nothing",
            kind,
            lattice.width,
            lattice.height,
            lattice.layers,
            MAX_CELLS
        );
    }
}

/// Generates the structure described by `config`.
#[must_use]
pub fn generate(config: &StructureConfig) -> Structure {
    match config {
        StructureConfig::Volumetric(c) => generate_volumetric(c),
        StructureConfig::Wall(c) => generate_wall(c),
        StructureConfig::Corridor(c) => generate_corridor(c),
    }
}

/// Generates a cave-like volume.
#[must_use]
pub fn generate_volumetric(config: &VolumetricConfig) -> Structure {
    let classifier = VolumetricClassifier::new(config);
    warn_if_oversized("volumetric", classifier.lattice());
    let grid = classifier.classify_all(config.order);
    let blocks = pack(&grid, &config.sizes, classifier.hash());

    let spacing = config.unit_size;
    let origin = config.bounds.map(|extent| -extent * 0.5 - spacing * 0.5);
    let frame = FaceFrame::aligned(origin, [spacing; 3]);

    let mut structure = Structure::default();
    structure.place_face(&blocks, &frame, 0.0, &config.notch, classifier.hash());
    structure.log_summary("volumetric", config.seed);
    structure
}

/// Generates a flat wall panel.
///
/// The panel spans `x` centred on the origin, rises from `y = 0` and is
/// centred on `z = 0` across its layers.
#[must_use]
pub fn generate_wall(config: &WallConfig) -> Structure {
    let [length, _, layers] = config.bounds;
    let lattice = config.lattice();
    warn_if_oversized("wall", lattice);
    let unit = config.unit_size;
    let frame = FaceFrame::aligned(
        [
            -f64::from(length) * unit[0] * 0.5,
            0.0,
            -f64::from(layers) * unit[2] * 0.5,
        ],
        unit,
    );

    let hash = CellHash::new(config.seed, WALL_STREAM);
    let face = Face {
        lattice,
        frame,
        band: config.band,
        hash,
    };

    let mut structure = Structure::default();
    face.build(
        &mut structure,
        &NoiseField::new(config.seed),
        &FaceStyle {
            sizes: &config.sizes,
            order: config.order,
            gap: config.gap,
            depth_jitter: config.depth_jitter,
            notch: &config.notch,
        },
    );
    structure.log_summary("wall", config.seed);
    structure
}

/// Generates a corridor running along `z`: two walls and a ceiling.
///
/// The floor is `y = 0`; the walls' inner faces sit at
/// `x = ±width / 2`. Each face is packed on its own.
#[must_use]
pub fn generate_corridor(config: &CorridorConfig) -> Structure {
    let [width, height, length] = config.bounds;
    let [along, across, thickness] = config.unit_size;
    let half_width = f64::from(width) * across * 0.5;
    let start_z = -f64::from(length) * along * 0.5;
    let wall_top = f64::from(height) * across;

    let wall_lattice = config.wall_lattice();
    let ceiling_lattice = config.ceiling_lattice();
    warn_if_oversized("corridor wall", wall_lattice);
    warn_if_oversized("corridor ceiling", ceiling_lattice);
    let faces = [
        Face {
            lattice: wall_lattice,
            frame: FaceFrame {
                origin: [-half_width - thickness, 0.0, start_z],
                axes: [2, 1, 0],
                steps: [along, across, thickness],
            },
            band: config.wall_band,
            hash: CellHash::new(config.seed, CORRIDOR_STREAMS[0]),
        },
        Face {
            lattice: wall_lattice,
            frame: FaceFrame {
                origin: [half_width, 0.0, start_z],
                axes: [2, 1, 0],
                steps: [along, across, thickness],
            },
            band: config.wall_band,
            hash: CellHash::new(config.seed, CORRIDOR_STREAMS[1]),
        },
        Face {
            lattice: ceiling_lattice,
            frame: FaceFrame {
                origin: [-half_width, wall_top, start_z],
                axes: [2, 0, 1],
                steps: [along, across, thickness],
            },
            band: config.ceiling_band,
            hash: CellHash::new(config.seed, CORRIDOR_STREAMS[2]),
        },
    ];

    let field = NoiseField::new(config.seed);
    let style = FaceStyle {
        sizes: &config.sizes,
        order: config.order,
        gap: config.gap,
        depth_jitter: config.depth_jitter,
        notch: &config.notch,
    };
    let mut structure = Structure::default();
    for face in &faces {
        face.build(&mut structure, &field, &style);
    }
    structure.log_summary("corridor", config.seed);
    structure
}

/// Settings shared by every face of one structure.
struct FaceStyle<'a> {
    sizes: &'a SizeTable,
    order: RasterOrder,
    gap: f64,
    depth_jitter: f64,
    notch: &'a NotchConfig,
}

/// One independently packed flat face.
struct Face {
    lattice: Lattice,
    frame: FaceFrame,
    band: BandPolicy,
    hash: CellHash,
}

impl Face {
    fn build(&self, structure: &mut Structure, field: &NoiseField, style: &FaceStyle<'_>) {
        let classifier = PanelClassifier::new(
            self.lattice,
            self.band,
            style.depth_jitter,
            field.clone(),
            self.hash,
        );
        let grid = classifier.classify_all(style.order);
        let blocks = pack(&grid, style.sizes, self.hash);
        structure.place_face(&blocks, &self.frame, style.gap, style.notch, self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_cells(structure: &Structure) -> u32 {
        structure.blocks().map(|b| b.extent[0] * b.extent[1] * b.extent[2]).sum()
    }

    #[test]
    fn test_wall_covers_every_cell() {
        let config = WallConfig::default();
        let structure = generate_wall(&config);
        let [l, h, d] = config.bounds;
        assert_eq!(covered_cells(&structure), l * h * d);
    }

    #[test]
    fn test_wall_is_deterministic() {
        let config = WallConfig {
            seed: Seed::new(1234),
            ..WallConfig::default()
        };
        assert_eq!(generate_wall(&config), generate_wall(&config));
    }

    #[test]
    fn test_seeds_change_the_wall() {
        let a = generate_wall(&WallConfig::default());
        let b = generate_wall(&WallConfig {
            seed: Seed::new(43),
            ..WallConfig::default()
        });
        assert_ne!(a, b);
    }

    #[test]
    fn test_wall_blocks_inside_panel() {
        let config = WallConfig::default();
        let structure = generate_wall(&config);
        let half_length = f64::from(config.bounds[0]) * config.unit_size[0] * 0.5;
        let top = f64::from(config.bounds[1]) * config.unit_size[1];
        for block in structure.blocks() {
            let p = block.position;
            assert!(f64::from(p.x).abs() <= half_length + 1e-4);
            assert!(f64::from(p.y) >= 0.0 && f64::from(p.y) <= top + 1e-4);
            assert!(block.size.x > 0.0 && block.size.y > 0.0 && block.size.z > 0.0);
        }
    }

    #[test]
    fn test_notch_descriptors_reference_blocks() {
        let structure = generate_wall(&WallConfig::default());
        assert!(!structure.notches.is_empty());
        for notch in &structure.notches {
            let block = structure.notched_block(notch).unwrap();
            assert_eq!(block.material, notch.material);
            assert!(notch.radius <= 0.4 * notch.width.min(notch.height) + 1e-12);
        }
        let mut seen: Vec<_> = structure.notches.iter().map(|n| (n.material, n.block)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), structure.notches.len(), "one notch per block at most");
    }

    #[test]
    fn test_notch_probability_bounds() {
        let never = generate_wall(&WallConfig {
            notch: NotchConfig::disabled(),
            ..WallConfig::default()
        });
        assert!(never.notches.is_empty());

        let always = generate_wall(&WallConfig {
            notch: NotchConfig {
                probability: 1.0,
                ..NotchConfig::default()
            },
            ..WallConfig::default()
        });
        assert_eq!(always.notches.len(), always.block_count());
    }

    #[test]
    fn test_corridor_faces_packed_independently() {
        let config = CorridorConfig::default();
        let structure = generate_corridor(&config);
        let [w, h, l] = config.bounds;
        assert_eq!(covered_cells(&structure), 2 * l * h + l * w);

        let half_width = f64::from(w) * config.unit_size[1] * 0.5;
        let wall_top = f64::from(h) * config.unit_size[1];
        let (mut left, mut right, mut ceiling) = (0, 0, 0);
        for block in structure.blocks() {
            let p = block.position;
            if f64::from(p.y) > wall_top {
                ceiling += 1;
            } else if f64::from(p.x) < -half_width {
                left += 1;
            } else if f64::from(p.x) > half_width {
                right += 1;
            } else {
                panic!("block inside the corridor at {p:?}");
            }
        }
        assert!(left > 0 && right > 0 && ceiling > 0);
    }

    #[test]
    fn test_corridor_accent_only_on_ceiling() {
        let config = CorridorConfig::default();
        let structure = generate_corridor(&config);
        let wall_top = f64::from(config.bounds[1]) * config.unit_size[1];
        assert!(!structure.accent.is_empty());
        assert!(structure.accent.iter().all(|b| f64::from(b.position.y) > wall_top));
    }

    #[test]
    fn test_volumetric_blocks_within_bounds() {
        let config = VolumetricConfig {
            bounds: [48.0; 3],
            ..VolumetricConfig::default()
        };
        let structure = generate_volumetric(&config);
        assert!(!structure.is_empty());
        assert!(structure.notches.is_empty());
        let reach = 24.0 + config.unit_size;
        for block in structure.blocks() {
            for c in block.position.to_array() {
                assert!(f64::from(c).abs() <= reach);
            }
            assert_eq!(block.extent, [1, 1, 1]);
        }
    }

    #[test]
    fn test_zero_bounds_give_empty_structure() {
        let wall = generate_wall(&WallConfig {
            bounds: [0, 12, 1],
            ..WallConfig::default()
        });
        assert!(wall.is_empty());
        let corridor = generate_corridor(&CorridorConfig {
            bounds: [0, 0, 0],
            ..CorridorConfig::default()
        });
        assert!(corridor.is_empty());
    }

    #[test]
    fn test_oversized_bounds_give_empty_structure() {
        let wall = generate_wall(&WallConfig {
            bounds: [u32::MAX; 3],
            ..WallConfig::default()
        });
        assert!(wall.is_empty());
        let corridor = generate_corridor(&CorridorConfig {
            bounds: [u32::MAX; 3],
            ..CorridorConfig::default()
        });
        assert!(corridor.is_empty());
        let volume = generate_volumetric(&VolumetricConfig {
            bounds: [1.0e12; 3],
            ..VolumetricConfig::default()
        });
        assert!(volume.is_empty());
    }

    #[test]
    fn test_generate_dispatches_on_kind() {
        let config = StructureConfig::Wall(WallConfig::default());
        assert_eq!(generate(&config), generate_wall(&WallConfig::default()));
    }

    #[test]
    fn test_face_frame_maps_axes() {
        let frame = FaceFrame {
            origin: [1.0, 2.0, 3.0],
            axes: [2, 0, 1],
            steps: [2.0, 0.5, 1.0],
        };
        assert_eq!(frame.world([1.0, 2.0, 3.0]), [2.0, 5.0, 5.0]);
        assert_eq!(frame.to_world_axes([7.0, 8.0, 9.0]), [8.0, 9.0, 7.0]);
    }

    #[test]
    fn test_notch_mesh_builds_from_descriptor() {
        let config = WallConfig::default();
        let structure = generate_wall(&config);
        let notch = structure.notches[0];
        let mesh = notch.mesh(&config.notch.builder());
        assert!(mesh.signed_volume() > 0.0);
    }
}
