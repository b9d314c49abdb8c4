//! Benchmark for height-map and chunk generation.
//!
//! TARGET: one surface chunk (height map + population) in under 5ms
//!
//! Run with: cargo bench --package strata_worldgen --bench heightmap_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_worldgen::{
    ChunkCoord, ColumnCoord, HeightMap, MemoryChunkStore, WorldGenerator, WorldSeed, WorldSettings,
};

fn generator() -> WorldGenerator {
    WorldGenerator::new(WorldSeed::new(42), WorldSettings::default())
        .expect("default settings are valid")
}

fn benchmark_height_samples(c: &mut Criterion) {
    let generator = generator();

    let mut group = c.benchmark_group("height");
    group.bench_function("precise", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            black_box(generator.height(black_box(x), black_box(x * 0.7), true))
        });
    });
    group.bench_function("approximate", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            black_box(generator.height(black_box(x), black_box(x * 0.7), false))
        });
    });
    group.finish();
}

fn benchmark_height_map(c: &mut Criterion) {
    let generator = generator();

    let mut group = c.benchmark_group("height_map");
    group.throughput(Throughput::Elements(32 * 32));
    group.bench_function("uncached_column", |b| {
        let mut cx = 0;
        b.iter(|| {
            cx += 1;
            black_box(HeightMap::generate(generator.compositor(), ColumnCoord::new(cx, 0)))
        });
    });
    group.bench_function("cached_column", |b| {
        let _ = generator.height_map(ColumnCoord::new(0, 0));
        b.iter(|| black_box(generator.height_map(black_box(ColumnCoord::new(0, 0)))));
    });
    group.finish();
}

fn benchmark_populate(c: &mut Criterion) {
    let generator = generator();
    let store = MemoryChunkStore::new();
    let height = generator.height(16.0, 16.0, true);
    let coord = ChunkCoord::from_block_pos(16, 16, height.round() as i32);

    let mut group = c.benchmark_group("populate");
    group.sample_size(20);
    group.bench_function("surface_chunk", |b| {
        b.iter(|| black_box(generator.generate_chunk(black_box(coord), &store)));
    });
    group.bench_function("super_lod", |b| {
        b.iter(|| black_box(generator.super_lod(black_box(coord))));
    });
    group.bench_function("lod_six", |b| {
        b.iter(|| black_box(generator.lod_six(black_box(coord))));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_height_samples,
    benchmark_height_map,
    benchmark_populate
);
criterion_main!(benches);
