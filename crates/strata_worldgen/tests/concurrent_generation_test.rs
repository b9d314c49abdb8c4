//! Integration test for generation from many worker threads.

use std::sync::{Arc, Barrier};
use std::thread;

use strata_worldgen::{
    ChunkCoord, ColumnCoord, HeightMap, MemoryChunkStore, WorldGenerator, WorldSeed, WorldSettings,
};

fn shared_generator() -> Arc<WorldGenerator> {
    Arc::new(
        WorldGenerator::new(WorldSeed::new(4242), WorldSettings::default())
            .expect("default settings are valid"),
    )
}

#[test]
fn test_single_height_map_generation_under_race() {
    let generator = shared_generator();
    let num_threads = 16;
    let barrier = Arc::new(Barrier::new(num_threads));
    let column = ColumnCoord::new(-7, 3);

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let generator = Arc::clone(&generator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                generator.height_map(column)
            })
        })
        .collect();

    let maps: Vec<Arc<HeightMap>> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    assert_eq!(generator.stats().heightmap_generations, 1);
    for map in &maps {
        assert!(Arc::ptr_eq(map, &maps[0]));
    }
}

#[test]
fn test_parallel_population_matches_sequential() {
    let generator = shared_generator();
    let coords: Vec<ChunkCoord> = (0..4)
        .flat_map(|x| (0..2).map(move |y| ChunkCoord::new(x, y, -3)))
        .collect();

    let sequential: Vec<Vec<u8>> = coords
        .iter()
        .map(|&coord| {
            let store = MemoryChunkStore::new();
            generator.generate_chunk(coord, &store).0.raw_bytes().to_vec()
        })
        .collect();

    // Adjacent chunks race on one shared store
    let store = Arc::new(MemoryChunkStore::new());
    let barrier = Arc::new(Barrier::new(coords.len()));
    let handles: Vec<_> = coords
        .iter()
        .map(|&coord| {
            let generator = Arc::clone(&generator);
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let _ = generator.generate_and_publish(coord, &*store);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    for (coord, expected) in coords.iter().zip(&sequential) {
        let chunk = store.get(*coord).expect("chunk was published");
        let chunk = chunk.lock();
        assert!(chunk.populated);
        assert_eq!(chunk.raw_bytes(), expected.as_slice(), "chunk {coord:?}");
    }
}

#[test]
fn test_ridge_networks_built_once_per_cluster() {
    let generator = shared_generator();
    let mountain = generator.compositor().mountains().cell_mountains(0, 0)[0];
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let generator = Arc::clone(&generator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                generator.compositor().network(&mountain)
            })
        })
        .collect();

    let networks: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    assert_eq!(generator.stats().ridge_generations, 1);
    for network in &networks {
        assert!(Arc::ptr_eq(network, &networks[0]));
    }
}
