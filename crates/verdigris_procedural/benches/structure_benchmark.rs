//! Benchmark for whole-structure generation.
//!
//! TARGET: reference volumetric structure (34^3 cells) in under 1 second
//!
//! Run with: cargo bench --package verdigris_procedural --bench structure_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use verdigris_procedural::{
    generate_corridor, generate_volumetric, generate_wall, CorridorConfig, NotchProfileBuilder,
    NotchSide, VolumetricConfig, WallConfig,
};

fn benchmark_volumetric(c: &mut Criterion) {
    let config = VolumetricConfig::default();

    let mut group = c.benchmark_group("volumetric");
    group.sample_size(10);
    group.throughput(Throughput::Elements(34 * 34 * 34));
    group.bench_function("reference_volume", |b| {
        b.iter(|| black_box(generate_volumetric(black_box(&config))));
    });
    group.finish();
}

fn benchmark_wall(c: &mut Criterion) {
    let config = WallConfig {
        bounds: [64, 32, 2],
        ..WallConfig::default()
    };

    c.bench_function("wall_64x32x2", |b| {
        b.iter(|| black_box(generate_wall(black_box(&config))));
    });
}

fn benchmark_corridor(c: &mut Criterion) {
    let config = CorridorConfig::default();

    c.bench_function("corridor_default", |b| {
        b.iter(|| black_box(generate_corridor(black_box(&config))));
    });
}

fn benchmark_notch_mesh(c: &mut Criterion) {
    let builder = NotchProfileBuilder::new();

    c.bench_function("notch_mesh", |b| {
        b.iter(|| {
            black_box(builder.build(
                black_box(2.0),
                black_box(1.0),
                black_box(1.0),
                NotchSide::Top,
                black_box(0.35),
            ))
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_volumetric,
              benchmark_wall,
              benchmark_corridor,
              benchmark_notch_mesh
}

criterion_main!(benches);
