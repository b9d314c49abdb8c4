//! # STRATA World Generation
//!
//! Deterministic terrain, biomes and voxels for an infinite chunked world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: every height, biome and voxel is a pure function of
//!    its coordinate and the world's seed set
//! 2. **Chunked**: the world is generated in `32³` chunks, shared height
//!    maps per chunk column
//! 3. **Shared**: one generator serves many worker threads; expensive work
//!    (ridge networks, height maps) runs once per key
//! 4. **Bounded**: both caches are cleared by a maintenance tick once they
//!    outgrow their configured limits
//!
//! ## Pipeline
//!
//! ```text
//! ChunkPopulator ──> HeightMapCache ──> HeightCompositor ──> SimplexNoise
//!       │                                     │
//!       │                                     └──> MountainGrid ──> RidgeNetwork (RidgeCache)
//!       └──> BiomeClassifier
//! LodSampler ──> HeightCompositor + BiomeClassifier   (no height-map cache)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_worldgen::{ChunkCoord, MemoryChunkStore, WorldGenerator, WorldSeed, WorldSettings};
//!
//! let settings = WorldSettings::load("config/worldgen.toml".as_ref())?;
//! let generator = WorldGenerator::new(WorldSeed::new(12345), settings)?;
//! let store = MemoryChunkStore::new();
//!
//! let (chunk, trees) = generator.generate_and_publish(ChunkCoord::new(0, 0, 0), &store);
//!
//! // Between ticks of the chunk loader
//! generator.maintain();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod biome;
pub mod block;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod error;
pub mod generator;
pub mod height;
pub mod heightmap;
pub mod lod;
pub mod mountain;
pub mod noise;
pub mod populate;
pub mod random;
pub mod ridge;
pub mod sampler;
pub mod store;

pub use biome::{Biome, BiomeClassifier, BiomeDescriptor, Climate};
pub use block::{material, Block, Direction, Shape};
pub use cache::StripedCache;
pub use chunk::{Chunk, ChunkCoord, ColumnCoord, CHUNK_SIZE};
pub use config::WorldSettings;
pub use error::{WorldGenError, WorldGenResult};
pub use generator::{GeneratorStats, MaintenanceReport, WorldGenerator};
pub use height::HeightCompositor;
pub use heightmap::{HeightMap, HeightMapCache, TreeSpawn};
pub use lod::LodSampler;
pub use mountain::{MountainData, MountainGrid};
pub use noise::{SeedSet, SimplexNoise, WorldSeed};
pub use populate::{ChunkPopulator, TreeSpawnRequest};
pub use ridge::{RidgeCache, RidgeNetwork, RidgeRaster, SearchMode};
pub use store::{ChunkHandle, ChunkStore, MemoryChunkStore};
