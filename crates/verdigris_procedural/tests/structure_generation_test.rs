//! # Structure Generation Tests
//!
//! End-to-end checks over the public pipeline: configuration in,
//! blocks and notch descriptors out.

use std::collections::HashSet;

use verdigris_procedural::{
    generate, generate_corridor, generate_volumetric, generate_wall, BlockSize, CorridorConfig,
    Material, NotchConfig, NotchProfileBuilder, RasterOrder, Seed, SizeTable, StructureConfig,
    VolumetricConfig, WallConfig,
};

fn small_volume(seed: u64) -> VolumetricConfig {
    VolumetricConfig {
        seed: Seed::new(seed),
        bounds: [45.0, 45.0, 45.0],
        ..VolumetricConfig::default()
    }
}

/// Test: Same seed and configuration reproduce the structure exactly.
#[test]
fn test_every_variant_is_deterministic() {
    let configs = [
        StructureConfig::Volumetric(small_volume(42)),
        StructureConfig::Wall(WallConfig::default()),
        StructureConfig::Corridor(CorridorConfig::default()),
    ];
    for config in &configs {
        let first = generate(config);
        let second = generate(config);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}

/// Test: Different seeds give different volumes.
#[test]
fn test_volumetric_seed_sensitivity() {
    let a = generate_volumetric(&small_volume(1));
    let b = generate_volumetric(&small_volume(2));
    assert_ne!(a, b);
}

/// Test: The volume has both materials and a hollow tunnel.
#[test]
fn test_volumetric_reference_shape() {
    let config = VolumetricConfig::default();
    let structure = generate_volumetric(&config);
    let cells = 34 * 34 * 34;

    let fill = structure.block_count() as f64 / f64::from(cells);
    println!(
        "Volumetric fill: {:.1}% ({} primary, {} accent)",
        fill * 100.0,
        structure.primary.len(),
        structure.accent.len()
    );
    assert!(fill > 0.02 && fill < 0.6, "implausible fill {fill}");
    assert!(!structure.primary.is_empty());
    assert!(!structure.accent.is_empty());
}

/// Test: Wall footprints never share a lattice cell.
#[test]
fn test_wall_footprints_disjoint() {
    let config = WallConfig {
        bounds: [40, 20, 3],
        ..WallConfig::default()
    };
    let structure = generate_wall(&config);

    let mut seen = HashSet::new();
    for block in structure.blocks() {
        for du in 0..block.extent[0] {
            for dv in 0..block.extent[1] {
                let cell = (block.origin.u + du, block.origin.v + dv, block.origin.layer);
                assert!(seen.insert(cell), "cell {cell:?} packed twice");
            }
        }
    }
    assert_eq!(seen.len(), 40 * 20 * 3);
}

/// Test: Wall accent sits in the horizontal band.
#[test]
fn test_wall_accent_band_height() {
    let config = WallConfig::default();
    let structure = generate_wall(&config);
    let height = f64::from(config.bounds[1]) * config.unit_size[1];

    assert!(!structure.accent.is_empty());
    for block in &structure.accent {
        let y = f64::from(block.position.y) / height;
        assert!((0.2..0.7).contains(&y), "accent block at relative height {y}");
    }
}

/// Test: Raster order changes the partition but not the coverage.
#[test]
fn test_raster_order_changes_partition_only() {
    let column = WallConfig::default();
    let row = WallConfig {
        order: RasterOrder::RowMajor,
        ..WallConfig::default()
    };
    let a = generate_wall(&column);
    let b = generate_wall(&row);
    assert_ne!(a, b);

    let area = |s: &verdigris_procedural::Structure| -> u32 {
        s.blocks().map(|b| b.extent[0] * b.extent[1]).sum()
    };
    assert_eq!(area(&a), area(&b));
}

/// Test: A single-size table yields only that size where it fits.
#[test]
fn test_custom_size_table() {
    let config = WallConfig {
        bounds: [8, 4, 1],
        sizes: SizeTable::new(vec![BlockSize::new(2, 2)]),
        band: verdigris_procedural::BandPolicy::Uniform,
        ..WallConfig::default()
    };
    let structure = generate_wall(&config);
    assert_eq!(structure.block_count(), 8);
    assert!(structure.blocks().all(|b| b.extent == [2, 2, 1]));
}

/// Test: Every notch descriptor builds a closed, outward mesh.
#[test]
fn test_notch_meshes_are_valid() {
    let config = CorridorConfig {
        notch: NotchConfig {
            probability: 0.5,
            ..NotchConfig::default()
        },
        ..CorridorConfig::default()
    };
    let structure = generate_corridor(&config);
    let builder = config.notch.builder();

    assert!(!structure.notches.is_empty());
    for notch in &structure.notches {
        let block = structure.notched_block(notch).expect("descriptor points at a block");
        assert_eq!(block.material, notch.material);

        let mesh = notch.mesh(&builder);
        let volume = mesh.signed_volume();
        assert!(volume > 0.0);
        assert!(volume < notch.width * notch.height * notch.depth);
    }
}

/// Test: Notch selection does not depend on which material a block has.
#[test]
fn test_notches_span_both_materials() {
    let config = WallConfig {
        bounds: [64, 24, 1],
        notch: NotchConfig {
            probability: 0.5,
            ..NotchConfig::default()
        },
        ..WallConfig::default()
    };
    let structure = generate_wall(&config);
    let materials: HashSet<Material> = structure.notches.iter().map(|n| n.material).collect();
    assert_eq!(materials.len(), 2);
}

/// Test: A TOML file drives the whole pipeline.
#[test]
fn test_toml_configuration_end_to_end() {
    let text = r#"
        kind = "corridor"
        seed = 2024
        bounds = [4, 6, 20]
        unit_size = [1.5, 1.0, 0.5]

        [notch]
        probability = 0.0
    "#;
    let config = StructureConfig::from_toml_str(text).unwrap();
    assert_eq!(config.seed(), Seed::new(2024));

    let structure = generate(&config);
    let area: u32 = structure.blocks().map(|b| b.extent[0] * b.extent[1]).sum();
    assert_eq!(area, 2 * 20 * 6 + 20 * 4);
    assert!(structure.notches.is_empty());
}

/// Test: The builder from a configuration honours its rounding.
#[test]
fn test_notch_config_builder() {
    let flat = NotchConfig {
        corner_radius: 0.0,
        bevel: 0.0,
        ..NotchConfig::default()
    }
    .builder();
    let rounded = NotchProfileBuilder::new();

    let a = flat.build(2.0, 1.0, 1.0, verdigris_procedural::NotchSide::Top, 0.3);
    let b = rounded.build(2.0, 1.0, 1.0, verdigris_procedural::NotchSide::Top, 0.3);
    assert!(a.signed_volume() > b.signed_volume());
}
