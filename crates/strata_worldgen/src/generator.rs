//! # World Generator
//!
//! Owns everything one world needs: seeds, settings, the two shared
//! caches, the height compositor, the biome classifier and the chunk
//! populator. Cheap to share across worker threads behind an `Arc`; it
//! starts no threads of its own.

use std::sync::Arc;

use crate::biome::{Biome, BiomeClassifier};
use crate::chunk::{Chunk, ChunkCoord, ColumnCoord};
use crate::config::WorldSettings;
use crate::error::WorldGenResult;
use crate::height::HeightCompositor;
use crate::heightmap::{HeightMap, HeightMapCache};
use crate::lod::LodSampler;
use crate::noise::{SeedSet, WorldSeed};
use crate::populate::{ChunkPopulator, TreeSpawnRequest};
use crate::ridge::RidgeCache;
use crate::store::{ChunkHandle, ChunkStore};

/// What a maintenance tick cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// The height-map cache was over its limit and was cleared.
    pub heightmaps_cleared: bool,
    /// The ridge-network cache was over its limit and was cleared.
    pub ridges_cleared: bool,
}

/// Cache sizes and generation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    /// Cached height maps.
    pub heightmaps: usize,
    /// Height maps generated since creation.
    pub heightmap_generations: u64,
    /// Cached ridge networks.
    pub ridge_networks: usize,
    /// Ridge networks built since creation.
    pub ridge_generations: u64,
}

/// Procedural world generator.
pub struct WorldGenerator {
    seeds: SeedSet,
    settings: WorldSettings,
    ridges: Arc<RidgeCache>,
    compositor: Arc<HeightCompositor>,
    classifier: Arc<BiomeClassifier>,
    heightmaps: Arc<HeightMapCache>,
    populator: ChunkPopulator,
}

impl WorldGenerator {
    /// Creates a generator for a world seed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the settings fail validation.
    pub fn new(seed: WorldSeed, settings: WorldSettings) -> WorldGenResult<Self> {
        Self::with_seed_set(SeedSet::from_world(seed), settings)
    }

    /// Creates a generator from an explicit seed set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the settings fail validation.
    pub fn with_seed_set(seeds: SeedSet, settings: WorldSettings) -> WorldGenResult<Self> {
        settings.validate()?;

        let ridges = Arc::new(RidgeCache::new(
            "ridge",
            settings.lock_stripes,
            settings.ridge_cache_limit,
        ));
        let heightmaps = Arc::new(HeightMapCache::new(
            settings.lock_stripes,
            settings.heightmap_cache_limit,
        ));
        let compositor = Arc::new(HeightCompositor::new(seeds, Arc::clone(&ridges)));
        let classifier = Arc::new(BiomeClassifier::new(&seeds, settings.sea_level));
        let populator = ChunkPopulator::new(
            settings.clone(),
            Arc::clone(&compositor),
            Arc::clone(&classifier),
            Arc::clone(&heightmaps),
        );

        tracing::debug!(
            "world generator ready (flat: {}, stripes: {})",
            settings.flat_debug_mode,
            settings.lock_stripes
        );

        Ok(Self {
            seeds,
            settings,
            ridges,
            compositor,
            classifier,
            heightmaps,
            populator,
        })
    }

    /// The world's seed set.
    #[must_use]
    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    /// The world's settings.
    #[must_use]
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// The height compositor.
    #[must_use]
    pub fn compositor(&self) -> &HeightCompositor {
        &self.compositor
    }

    /// Terrain height at a world point.
    #[must_use]
    pub fn height(&self, x: f64, y: f64, precise: bool) -> f64 {
        self.compositor.height(x, y, precise)
    }

    /// Biome of a world voxel.
    #[must_use]
    pub fn biome_at(&self, x: f64, y: f64, z: i32) -> Biome {
        let height = self.compositor.height(x, y, true);
        self.classifier.biome_for(x, y, z, height)
    }

    /// The column's height map, generated at most once while cached.
    #[must_use]
    pub fn height_map(&self, column: ColumnCoord) -> Arc<HeightMap> {
        self.heightmaps.get(&self.compositor, column)
    }

    /// Populates a chunk in place. See [`ChunkPopulator::populate`].
    ///
    /// `chunk` must not be locked through `store` while this runs.
    pub fn populate(&self, chunk: &mut Chunk, store: &dyn ChunkStore) -> Vec<TreeSpawnRequest> {
        self.populator.populate(chunk, store)
    }

    /// Creates and populates a fresh chunk. The caller publishes it.
    #[must_use]
    pub fn generate_chunk(
        &self,
        coord: ChunkCoord,
        store: &dyn ChunkStore,
    ) -> (Chunk, Vec<TreeSpawnRequest>) {
        let mut chunk = Chunk::new(coord);
        let trees = self.populator.populate(&mut chunk, store);
        (chunk, trees)
    }

    /// Creates and populates a fresh chunk, then publishes it to `store`.
    ///
    /// Population runs without any store handle locked; the chunk only
    /// becomes reachable once it is complete.
    pub fn generate_and_publish(
        &self,
        coord: ChunkCoord,
        store: &dyn ChunkStore,
    ) -> (ChunkHandle, Vec<TreeSpawnRequest>) {
        let (chunk, trees) = self.generate_chunk(coord, store);
        (store.publish(chunk), trees)
    }

    /// Encoded 2×2×2 LOD of a chunk.
    #[must_use]
    pub fn super_lod(&self, coord: ChunkCoord) -> Vec<u8> {
        self.lod().super_lod(coord)
    }

    /// Encoded 5×5×5 LOD of a chunk.
    #[must_use]
    pub fn lod_six(&self, coord: ChunkCoord) -> Vec<u8> {
        self.lod().lod_six(coord)
    }

    fn lod(&self) -> LodSampler<'_> {
        LodSampler::new(&self.compositor, &self.classifier, &self.settings)
    }

    /// Maintenance tick: clears each cache that is over its limit.
    pub fn maintain(&self) -> MaintenanceReport {
        MaintenanceReport {
            heightmaps_cleared: self.heightmaps.maintain(),
            ridges_cleared: self.ridges.maintain(),
        }
    }

    /// Current cache statistics.
    #[must_use]
    pub fn stats(&self) -> GeneratorStats {
        GeneratorStats {
            heightmaps: self.heightmaps.len(),
            heightmap_generations: self.heightmaps.generations(),
            ridge_networks: self.ridges.len(),
            ridge_generations: self.ridges.generations(),
        }
    }
}
