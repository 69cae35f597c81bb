//! # Structure Configuration
//!
//! One configuration record per structure variant, loaded once before a
//! generation pass. Every field has a default, so a TOML file only lists
//! what it overrides:
//!
//! ```toml
//! kind = "wall"
//! seed = 7
//! bounds = [24, 10, 1]
//!
//! [notch]
//! probability = 0.25
//! ```
//!
//! Loading validates values that would make generation meaningless
//! (non-finite sizes, probabilities outside `[0, 1]`, size tables with no
//! weight, lattices above [`MAX_CELLS`]). Degenerate but well-formed values
//! such as zero bounds are accepted and generate an empty structure.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::BandPolicy;
use crate::error::{ConfigError, ConfigResult};
use crate::lattice::{Lattice, RasterOrder, MAX_CELLS};
use crate::noise::Seed;
use crate::notch::NotchProfileBuilder;
use crate::packer::SizeTable;

/// Density and accent thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum density for a cell to be solid.
    pub base: f64,
    /// Noise level above which a solid cell becomes accent material.
    pub accent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            base: 0.08,
            accent: 0.52,
        }
    }
}

/// Decorative notch selection and profile parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotchConfig {
    /// Chance in `[0, 1]` that a packed block is notched.
    pub probability: f64,
    /// Requested notch radius in world units (clamped per face).
    pub radius: f64,
    /// Corner rounding of the face outline.
    pub corner_radius: f64,
    /// Bevel between the face and the extruded sides.
    pub bevel: f64,
}

impl NotchConfig {
    /// A configuration that never notches.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            probability: 0.0,
            ..Self::default()
        }
    }

    /// Profile builder using this configuration's rounding and bevel.
    #[must_use]
    pub fn builder(&self) -> NotchProfileBuilder {
        NotchProfileBuilder::new()
            .with_corner_radius(self.corner_radius)
            .with_bevel(self.bevel)
    }
}

impl Default for NotchConfig {
    fn default() -> Self {
        Self {
            probability: 0.22,
            radius: 0.35,
            corner_radius: 0.06,
            bevel: 0.02,
        }
    }
}

/// Weights of the volumetric density terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityWeights {
    /// Ridged noise (folded fbm).
    pub ridged: f64,
    /// Low-frequency, vertically stretched pillar fbm.
    pub pillar: f64,
    /// Vertical falloff bias `exp(-|y| k)`.
    pub vertical: f64,
    /// Secondary cave fbm.
    pub cave: f64,
}

impl Default for DensityWeights {
    fn default() -> Self {
        Self {
            ridged: 0.35,
            pillar: 0.5,
            vertical: 0.25,
            cave: 0.6,
        }
    }
}

/// Walkable tunnel carved through the volumetric field along `z`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorMask {
    /// Mean tunnel radius in world units. Zero disables the tunnel.
    pub radius: f64,
    /// Height of the tunnel axis.
    pub center_y: f64,
    /// Relative radius variation driven by fbm of `y`.
    pub variation: f64,
    /// Extra density a cell needs to stay solid inside the tunnel.
    pub clearance: f64,
}

impl Default for CorridorMask {
    fn default() -> Self {
        Self {
            radius: 15.0,
            center_y: 5.0,
            variation: 0.4,
            clearance: 0.15,
        }
    }
}

/// Cave-like volumetric structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumetricConfig {
    /// Noise seed.
    pub seed: Seed,
    /// Lattice spacing in world units.
    pub unit_size: f64,
    /// World extent per axis, centred on the origin.
    pub bounds: [f64; 3],
    /// Density and primary accent thresholds.
    pub thresholds: Thresholds,
    /// Threshold of the second accent sample (upper half only).
    pub secondary_accent: f64,
    /// World-to-noise frequency.
    pub frequency: f64,
    /// Domain warp strength in noise units.
    pub warp_strength: f64,
    /// Density term weights.
    pub weights: DensityWeights,
    /// Vertical falloff rate `k`.
    pub vertical_falloff: f64,
    /// Central tunnel.
    pub corridor: CorridorMask,
    /// Ellipsoidal boundary as a fraction of the mean extent.
    pub boundary: f64,
    /// Normalised radius where stochastic thinning starts.
    pub thinning_start: f64,
    /// Per-axis scale jitter (`0.3` gives `0.7..1.3`).
    pub scale_jitter: f64,
    /// Position jitter in cell units.
    pub position_jitter: f64,
    /// Maximum tilt in radians for primary blocks.
    pub primary_tilt: f64,
    /// Maximum tilt in radians for accent blocks.
    pub accent_tilt: f64,
    /// Block size table; a single 1x1 entry keeps one block per cell.
    pub sizes: SizeTable,
    /// Sweep order of each `z` layer.
    pub order: RasterOrder,
    /// Notch decoration (off by default).
    pub notch: NotchConfig,
}

impl Default for VolumetricConfig {
    fn default() -> Self {
        Self {
            seed: Seed::default(),
            unit_size: 3.0,
            bounds: [100.0; 3],
            thresholds: Thresholds::default(),
            secondary_accent: 0.45,
            frequency: 0.025,
            warp_strength: 0.35,
            weights: DensityWeights::default(),
            vertical_falloff: 1.5,
            corridor: CorridorMask::default(),
            boundary: 0.55,
            thinning_start: 0.8,
            scale_jitter: 0.3,
            position_jitter: 0.2,
            primary_tilt: 0.075,
            accent_tilt: 0.05,
            sizes: SizeTable::single(),
            order: RasterOrder::default(),
            notch: NotchConfig::disabled(),
        }
    }
}

impl VolumetricConfig {
    /// Sampling lattice: `u → x`, `v → y`, `layer → z`.
    #[must_use]
    pub fn lattice(&self) -> Lattice {
        let [x, y, z] = self.bounds.map(|extent| cells_along(extent, self.unit_size));
        Lattice::new(x, y, z)
    }
}

/// Cells covering `[-extent/2, extent/2)` at `spacing`; zero for
/// degenerate input.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cells_along(extent: f64, spacing: f64) -> u32 {
    if !(extent.is_finite() && spacing.is_finite()) || extent <= 0.0 || spacing <= 0.0 {
        return 0;
    }
    (extent / spacing).ceil().min(f64::from(u32::MAX)) as u32
}

/// Flat brick wall panel in the `x`/`y` plane, layers stacked along `z`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Hash seed.
    pub seed: Seed,
    /// Brick unit: length, height, layer depth.
    pub unit_size: [f64; 3],
    /// Lattice cells: length, height, layers.
    pub bounds: [u32; 3],
    /// Accent band.
    pub band: BandPolicy,
    /// Block size table.
    pub sizes: SizeTable,
    /// Sweep order within a layer.
    pub order: RasterOrder,
    /// Mortar gap subtracted from each block's face.
    pub gap: f64,
    /// Relative depth variation per block.
    pub depth_jitter: f64,
    /// Notch decoration.
    pub notch: NotchConfig,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            seed: Seed::default(),
            unit_size: [2.0, 1.0, 1.0],
            bounds: [24, 12, 1],
            band: BandPolicy::horizontal(),
            sizes: SizeTable::default(),
            order: RasterOrder::default(),
            gap: 0.06,
            depth_jitter: 0.2,
            notch: NotchConfig::default(),
        }
    }
}

impl WallConfig {
    /// Lattice of the panel: length, height, layers.
    #[must_use]
    pub const fn lattice(&self) -> Lattice {
        let [length, height, layers] = self.bounds;
        Lattice::new(length, height, layers)
    }
}

/// Corridor along `z`: two walls and a ceiling, each packed independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Hash seed.
    pub seed: Seed,
    /// Brick unit: length (along `z`), height/width, thickness.
    pub unit_size: [f64; 3],
    /// Lattice cells: width (across), height (walls), length (along `z`).
    pub bounds: [u32; 3],
    /// Accent band on the walls.
    pub wall_band: BandPolicy,
    /// Accent band across the ceiling.
    pub ceiling_band: BandPolicy,
    /// Block size table.
    pub sizes: SizeTable,
    /// Sweep order within each face.
    pub order: RasterOrder,
    /// Mortar gap subtracted from each block's face.
    pub gap: f64,
    /// Relative depth variation per block.
    pub depth_jitter: f64,
    /// Notch decoration.
    pub notch: NotchConfig,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            seed: Seed::default(),
            unit_size: [2.0, 1.0, 1.0],
            bounds: [6, 8, 32],
            wall_band: BandPolicy::Uniform,
            ceiling_band: BandPolicy::centered(),
            sizes: SizeTable::default(),
            order: RasterOrder::default(),
            gap: 0.06,
            depth_jitter: 0.2,
            notch: NotchConfig::default(),
        }
    }
}

impl CorridorConfig {
    /// Lattice of each side wall: length by height.
    #[must_use]
    pub const fn wall_lattice(&self) -> Lattice {
        let [_, height, length] = self.bounds;
        Lattice::flat(length, height)
    }

    /// Lattice of the ceiling: length by width.
    #[must_use]
    pub const fn ceiling_lattice(&self) -> Lattice {
        let [width, _, length] = self.bounds;
        Lattice::flat(length, width)
    }
}

/// Configuration of any structure variant, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureConfig {
    /// Cave-like volume.
    Volumetric(VolumetricConfig),
    /// Flat wall panel.
    Wall(WallConfig),
    /// Corridor with walls and ceiling.
    Corridor(CorridorConfig),
}

impl StructureConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Seed of the configured structure.
    #[must_use]
    pub const fn seed(&self) -> Seed {
        match self {
            Self::Volumetric(c) => c.seed,
            Self::Wall(c) => c.seed,
            Self::Corridor(c) => c.seed,
        }
    }

    /// Checks values that would make generation meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let result = match self {
            Self::Volumetric(c) => validate_volumetric(c),
            Self::Wall(c) => validate_lattice("bounds", c.lattice()).and_then(|()| {
                validate_faces(&c.unit_size, c.gap, c.depth_jitter, &c.sizes, &c.notch)
            }),
            Self::Corridor(c) => validate_lattice("bounds", c.wall_lattice())
                .and_then(|()| validate_lattice("bounds", c.ceiling_lattice()))
                .and_then(|()| {
                    validate_faces(&c.unit_size, c.gap, c.depth_jitter, &c.sizes, &c.notch)
                }),
        };
        if let Err(ConfigError::Invalid(reason)) = &result {
            tracing::warn!("Rejected structure configuration: {}", reason);
        }
        result
    }
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self::Volumetric(VolumetricConfig::default())
    }
}

fn validate_volumetric(c: &VolumetricConfig) -> ConfigResult<()> {
    positive("unit_size", c.unit_size)?;
    for (axis, extent) in c.bounds.iter().enumerate() {
        non_negative(&format!("bounds[{axis}]"), *extent)?;
    }
    validate_lattice("bounds", c.lattice())?;
    finite("thresholds.base", c.thresholds.base)?;
    finite("thresholds.accent", c.thresholds.accent)?;
    finite("secondary_accent", c.secondary_accent)?;
    finite("frequency", c.frequency)?;
    non_negative("warp_strength", c.warp_strength)?;
    non_negative("corridor.radius", c.corridor.radius)?;
    non_negative("boundary", c.boundary)?;
    unit_interval("thinning_start", c.thinning_start)?;
    non_negative("scale_jitter", c.scale_jitter)?;
    non_negative("position_jitter", c.position_jitter)?;
    validate_sizes(&c.sizes)?;
    validate_notch(&c.notch)
}

fn validate_faces(
    unit_size: &[f64; 3],
    gap: f64,
    depth_jitter: f64,
    sizes: &SizeTable,
    notch: &NotchConfig,
) -> ConfigResult<()> {
    for (axis, unit) in unit_size.iter().enumerate() {
        positive(&format!("unit_size[{axis}]"), *unit)?;
    }
    non_negative("gap", gap)?;
    unit_interval("depth_jitter", depth_jitter)?;
    validate_sizes(sizes)?;
    validate_notch(notch)
}

fn validate_lattice(name: &str, lattice: Lattice) -> ConfigResult<()> {
    if lattice.is_oversized() {
        return Err(ConfigError::Invalid(format!(
            "{name}: {}x{}x{} lattice exceeds {MAX_CELLS} cells",
            lattice.width, lattice.height, lattice.layers
        )));
    }
    Ok(())
}

fn validate_sizes(sizes: &SizeTable) -> ConfigResult<()> {
    if sizes.entries().iter().any(|s| s.width == 0 || s.height == 0) {
        return Err(ConfigError::Invalid("sizes: zero-extent entry".into()));
    }
    if !sizes.entries().is_empty() && sizes.total_weight() == 0 {
        return Err(ConfigError::Invalid("sizes: total weight is zero".into()));
    }
    Ok(())
}

fn validate_notch(notch: &NotchConfig) -> ConfigResult<()> {
    unit_interval("notch.probability", notch.probability)?;
    non_negative("notch.radius", notch.radius)?;
    non_negative("notch.corner_radius", notch.corner_radius)?;
    non_negative("notch.bevel", notch.bevel)
}

fn finite(name: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> ConfigResult<()> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")))
    }
}

fn positive(name: &str, value: f64) -> ConfigResult<()> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be > 0, got {value}")))
    }
}

fn unit_interval(name: &str, value: f64) -> ConfigResult<()> {
    finite(name, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must lie in [0, 1], got {value}")))
    }
}
