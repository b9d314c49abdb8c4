//! Benchmark for ridge-network construction and queries.
//!
//! Run with: cargo bench --package strata_worldgen --bench ridge_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_worldgen::{MountainData, MountainGrid, RidgeNetwork, SearchMode};

fn mountain() -> MountainData {
    MountainData {
        center: (0, 0),
        height_amplitude: 300.0,
        radius: 420.0,
    }
}

fn benchmark_build(c: &mut Criterion) {
    c.bench_function("ridge_network_build", |b| {
        let mut seed = 0i64;
        b.iter(|| {
            seed += 1;
            black_box(RidgeNetwork::generate(&mountain(), black_box(seed)))
        });
    });
}

fn benchmark_queries(c: &mut Criterion) {
    let network = RidgeNetwork::generate(&mountain(), 7);

    let mut group = c.benchmark_group("ridge_query");
    for (name, mode) in [("precise", SearchMode::PRECISE), ("approximate", SearchMode::APPROXIMATE)] {
        group.bench_function(name, |b| {
            let mut t = 0.0f64;
            b.iter(|| {
                t += 0.37;
                let x = (t * 13.0) % 800.0 - 400.0;
                let y = (t * 7.0) % 800.0 - 400.0;
                black_box(network.height_at(black_box(x), black_box(y), mode))
            });
        });
    }
    group.finish();
}

fn benchmark_raster(c: &mut Criterion) {
    let network = RidgeNetwork::generate(&mountain(), 7);

    let mut group = c.benchmark_group("ridge_raster");
    group.sample_size(10);
    group.bench_function("step_8", |b| {
        b.iter(|| black_box(network.rasterize(black_box(8.0))));
    });
    group.finish();
}

fn benchmark_placement(c: &mut Criterion) {
    let grid = MountainGrid::new(42);

    c.bench_function("mountains_near", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 97.0;
            black_box(grid.mountains_near(black_box(x), black_box(-x)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_queries,
    benchmark_raster,
    benchmark_placement
);
criterion_main!(benches);
