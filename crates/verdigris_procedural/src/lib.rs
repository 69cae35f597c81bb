//! # Verdigris Procedural Structures
//!
//! Deterministic generation of block-built architecture: cave-like
//! volumes, brick wall panels and corridors, decorated with notched
//! blocks.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed and configuration, same blocks, bit for bit
//! 2. **Total**: generation never fails; degenerate input yields nothing
//! 3. **No ambient randomness**: every draw comes from a keyed cell hash
//! 4. **Renderer-agnostic**: output is plain data and `Pod` meshes
//!
//! ## Pipeline
//!
//! - [`NoiseField`]: seeded 3-D gradient noise
//! - [`fractal`]: `fbm`, `domain_warp`, `ridged_noise`
//! - [`DensityClassifier`]: per-cell solid/material decision
//! - [`PackingPass`]: greedy variable-size block packing
//! - [`NotchProfileBuilder`]: notched, bevelled block meshes
//! - [`generate`]: the whole pipeline for one [`StructureConfig`]
//!
//! ## Example
//!
//! ```rust
//! use verdigris_procedural::{generate, StructureConfig};
//!
//! let config = StructureConfig::from_toml_str("kind = \"wall\"\nseed = 7\n").unwrap();
//! let structure = generate(&config);
//!
//! assert!(structure.block_count() > 0);
//! assert_eq!(structure, generate(&config));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod fractal;
pub mod hash;
pub mod lattice;
pub mod noise;
pub mod notch;
pub mod packer;
pub mod structure;

pub use classifier::{
    BandPolicy, ColorVariant, DensityClassifier, DensitySample, Material, PanelClassifier,
    VolumetricClassifier,
};
pub use config::{
    CorridorConfig, CorridorMask, DensityWeights, NotchConfig, StructureConfig, Thresholds,
    VolumetricConfig, WallConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use fractal::{domain_warp, fbm, ridged_noise};
pub use hash::{CellHash, Channel};
pub use lattice::{DensityGrid, Lattice, LatticeCoord, RasterOrder, MAX_CELLS};
pub use noise::{NoiseField, Seed};
pub use notch::{Mesh, MeshVertex, NotchProfile, NotchProfileBuilder, NotchSide};
pub use packer::{pack, BlockSize, FaceBlock, OccupancySet, PackingPass, SizeTable};
pub use structure::{
    generate, generate_corridor, generate_volumetric, generate_wall, FaceFrame, NotchDescriptor,
    PackedBlock, Structure,
};
