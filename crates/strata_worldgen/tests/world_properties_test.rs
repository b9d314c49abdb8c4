//! # World Property Tests
//!
//! End-to-end checks of the generator's guarantees: determinism, cache
//! consistency, seam continuity, biome totality, flat worlds, eviction
//! and ridge bounds.

use std::sync::Arc;

use strata_worldgen::ridge::RIDGE_AMPLITUDE;
use strata_worldgen::{
    material, Biome, BiomeClassifier, ChunkCoord, ColumnCoord, MemoryChunkStore, MountainGrid,
    RidgeNetwork, SearchMode, WorldGenerator, WorldSeed, WorldSettings, CHUNK_SIZE,
};

fn generator(seed: u64) -> WorldGenerator {
    WorldGenerator::new(WorldSeed::new(seed), WorldSettings::default())
        .expect("default settings are valid")
}

/// Test: Height is bit-identical across calls and generator instances.
#[test]
fn test_height_is_deterministic() {
    let a = generator(42);
    let b = generator(42);

    for i in -100..100 {
        let x = f64::from(i) * 73.3;
        let y = f64::from(i) * -41.9 + 1000.0;
        for precise in [true, false] {
            let first = a.height(x, y, precise);
            assert_eq!(first.to_bits(), a.height(x, y, precise).to_bits());
            assert_eq!(first.to_bits(), b.height(x, y, precise).to_bits());
        }
    }
}

/// Test: Every height-map entry equals the compositor at that column.
#[test]
fn test_height_map_matches_compositor() {
    let generator = generator(7);

    // Include columns next to a mountain so ridge lookups are exercised
    let mountain = MountainGrid::new(generator.seeds().world()).cell_mountains(0, 0)[0];
    let near = ColumnCoord::from_block_pos(mountain.center.0, mountain.center.1);

    let columns = [
        ColumnCoord::new(0, 0),
        ColumnCoord::new(-5, 12),
        near,
        ColumnCoord::new(near.x + 1, near.y),
    ];
    for column in columns {
        let map = generator.height_map(column);
        for dy in 0..CHUNK_SIZE {
            for dx in 0..CHUNK_SIZE {
                let x = f64::from(column.world_x() + dx as i32);
                let y = f64::from(column.world_y() + dy as i32);
                assert_eq!(
                    map.height(dx, dy).to_bits(),
                    generator.height(x, y, true).to_bits(),
                    "column {column:?} at ({dx}, {dy})"
                );
            }
        }
    }
}

/// Test: No seams where one chunk column meets the next.
#[test]
fn test_chunk_boundaries_are_continuous() {
    let generator = generator(1234);
    let compositor = generator.compositor();
    let mut checked = 0;

    for cx in -20..20 {
        for row in [0, 11, 31] {
            let x = f64::from(cx * 32 + 31);
            let y = f64::from(cx * 17 + row);

            let mountains = compositor.mountains().mountains_near(x, y);
            let near_mountain = compositor.mountain_contribution(x, y, true, &mountains) > 0.0
                || compositor.mountain_contribution(x + 1.0, y, true, &mountains) > 0.0;
            if near_mountain {
                continue;
            }

            let last = generator.height(x, y, true);
            let first = generator.height(x + 1.0, y, true);
            assert!(
                (last - first).abs() < 8.0,
                "seam between x={x} and x={} at y={y}: {last} vs {first}",
                x + 1.0
            );
            checked += 1;
        }
    }
    assert!(checked > 0, "every probe was next to a mountain");
}

/// Test: Deep columns are hell whatever the climate.
#[test]
fn test_deep_columns_are_hell() {
    let generator = generator(99);
    let classifier = BiomeClassifier::new(generator.seeds(), 0);
    for i in 0..200 {
        let x = f64::from(i) * 311.0 - 30_000.0;
        let y = f64::from(i) * -187.0;
        assert_eq!(classifier.biome_for(x, y, 0, -400.0), Biome::Hell);
    }
    assert_eq!(generator.biome_at(0.0, 0.0, -1000), Biome::Hell);
}

/// Test: Flat debug worlds are grass, dirt, dirt, stone at layer 0.
#[test]
fn test_flat_world_scenario() {
    let generator = WorldGenerator::new(WorldSeed::new(1), WorldSettings::flat())
        .expect("flat settings are valid");
    let store = MemoryChunkStore::new();

    let (ground, trees) = generator.generate_chunk(ChunkCoord::new(5, -5, 0), &store);
    assert!(trees.is_empty());
    for z in (0..CHUNK_SIZE).rev() {
        let expected = match CHUNK_SIZE - 1 - z {
            0 => material::GRASS,
            1 | 2 => material::DIRT,
            _ => material::STONE,
        };
        for (x, y) in [(0, 0), (12, 30), (31, 31)] {
            assert_eq!(ground.get_block(x, y, z).material, expected, "z = {z}");
        }
    }

    let (below, _) = generator.generate_chunk(ChunkCoord::new(5, -5, -1), &store);
    assert!(below.blocks().iter().all(|b| b.material == material::STONE));

    for cz in 1..4 {
        let (above, _) = generator.generate_chunk(ChunkCoord::new(5, -5, cz), &store);
        assert!(above.blocks().iter().all(|b| b.is_air()));
    }
}

/// Test: After eviction a cached key is regenerated, not reused.
#[test]
fn test_maintenance_evicts_height_maps() {
    let settings = WorldSettings {
        heightmap_cache_limit: 4,
        ..WorldSettings::default()
    };
    let generator = WorldGenerator::new(WorldSeed::new(3), settings).expect("valid settings");

    let first = generator.height_map(ColumnCoord::new(0, 0));
    for x in 1..6 {
        let _ = generator.height_map(ColumnCoord::new(x, 0));
    }
    assert!(generator.maintain().heightmaps_cleared);

    let second = generator.height_map(ColumnCoord::new(0, 0));
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.heights(), second.heights());
    assert_eq!(generator.stats().heightmap_generations, 7);
}

/// Test: Ridge networks stay inside [0, amplitude] and never produce NaN.
#[test]
fn test_ridge_network_bounds() {
    let grid = MountainGrid::new(555);
    for mountain in grid.cell_mountains(1, -1).iter().take(4) {
        let network = RidgeNetwork::generate(mountain, 555);
        let (cx, cy) = network.center();
        let reach = network.radius() + 20.0;

        let mut y = cy - reach;
        while y <= cy + reach {
            let mut x = cx - reach;
            while x <= cx + reach {
                for mode in [SearchMode::PRECISE, SearchMode::APPROXIMATE] {
                    let h = network.height_at(x, y, mode);
                    assert!(!h.is_nan());
                    assert!((0.0..=RIDGE_AMPLITUDE).contains(&h), "{h} at ({x}, {y})");
                }
                x += 9.5;
            }
            y += 9.5;
        }
    }
}

/// Test: A populated surface chunk is solid below and open above.
#[test]
fn test_surface_chunk_has_ground_and_sky() {
    let generator = generator(2);
    let store = MemoryChunkStore::new();
    let height = generator.height(16.0, 16.0, true);
    let coord = ChunkCoord::from_block_pos(16, 16, height.round() as i32);

    let (chunk, _) = generator.generate_chunk(coord, &store);
    let (below, _) = generator.generate_chunk(coord.offset(0, 0, -1), &store);
    let (above, _) = generator.generate_chunk(coord.offset(0, 0, 4), &store);

    assert!(chunk.blocks().iter().any(|b| !b.is_air()));
    assert!(below.blocks().iter().any(|b| !b.is_air()));
    assert!(above.blocks().iter().all(|b| b.is_air() || material::is_fluid(b.material)));
}

/// Test: LOD buffers have the documented sizes and agree with the deep rock.
#[test]
fn test_lod_buffers() {
    let generator = generator(8);
    let deep = ChunkCoord::new(3, 3, -30);

    let super_lod = generator.super_lod(deep);
    let lod_six = generator.lod_six(deep);
    assert_eq!(super_lod.len(), 8 * 2);
    assert_eq!(lod_six.len(), 125 * 2);

    let hellstone = material::HELLSTONE.to_le_bytes();
    assert!(super_lod.chunks_exact(2).all(|cell| cell == hellstone));
    assert!(lod_six.chunks_exact(2).all(|cell| cell == hellstone));
}
