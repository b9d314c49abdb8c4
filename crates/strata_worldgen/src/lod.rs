//! # LOD Samplers
//!
//! Coarse chunk approximations for distant rendering. Both samplers read
//! the height compositor directly with the approximate ridge search,
//! bypassing the height-map cache, and layer materials with the same
//! routine the populator uses. No carving, shapes, shorelines or ores.
//!
//! ## Encoding
//!
//! One `u16` material per cell, little-endian, z-major then y then x:
//! `index = x + y * n + z * n²`.

use crate::biome::BiomeClassifier;
use crate::chunk::ChunkCoord;
use crate::config::WorldSettings;
use crate::height::HeightCompositor;
use crate::sampler::{sample_columns, sample_materials};

/// Cells per axis of the super LOD.
pub const SUPER_LOD_CELLS: usize = 2;

/// Cells per axis of the LOD-six grid.
pub const LOD_SIX_CELLS: usize = 5;

/// Bytes per LOD cell.
pub const LOD_CELL_BYTES: usize = 2;

/// Shared sampling context.
pub struct LodSampler<'a> {
    compositor: &'a HeightCompositor,
    classifier: &'a BiomeClassifier,
    settings: &'a WorldSettings,
}

impl<'a> LodSampler<'a> {
    /// Borrows the generator's pieces.
    #[must_use]
    pub fn new(
        compositor: &'a HeightCompositor,
        classifier: &'a BiomeClassifier,
        settings: &'a WorldSettings,
    ) -> Self {
        Self {
            compositor,
            classifier,
            settings,
        }
    }

    /// Materials of a `cells³` grid over the chunk, in LOD order.
    #[must_use]
    pub fn materials(&self, chunk: ChunkCoord, cells: usize) -> Vec<u16> {
        let samples = sample_columns(self.classifier, chunk.column(), cells, |x, y| {
            if self.settings.flat_debug_mode {
                0.0
            } else {
                self.compositor.height(f64::from(x), f64::from(y), false)
            }
        });
        sample_materials(&samples, chunk, cells, self.settings)
    }

    /// The 2×2×2 grid, encoded.
    #[must_use]
    pub fn super_lod(&self, chunk: ChunkCoord) -> Vec<u8> {
        encode(&self.materials(chunk, SUPER_LOD_CELLS))
    }

    /// The 5×5×5 grid, encoded.
    #[must_use]
    pub fn lod_six(&self, chunk: ChunkCoord) -> Vec<u8> {
        encode(&self.materials(chunk, LOD_SIX_CELLS))
    }
}

/// Encodes materials as little-endian `u16`s.
#[must_use]
pub fn encode(materials: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(materials.len() * LOD_CELL_BYTES);
    for material in materials {
        out.extend_from_slice(&material.to_le_bytes());
    }
    out
}

/// Decodes a buffer produced by [`encode`]. A trailing odd byte is ignored.
#[must_use]
pub fn decode(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(LOD_CELL_BYTES)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::material;
    use crate::noise::{SeedSet, WorldSeed};
    use crate::ridge::RidgeCache;
    use std::sync::Arc;

    struct Fixture {
        compositor: HeightCompositor,
        classifier: BiomeClassifier,
        settings: WorldSettings,
    }

    fn fixture(settings: WorldSettings) -> Fixture {
        let seeds = SeedSet::from_world(WorldSeed::new(6));
        Fixture {
            compositor: HeightCompositor::new(seeds, Arc::new(RidgeCache::new("ridge", 2, 16))),
            classifier: BiomeClassifier::new(&seeds, settings.sea_level),
            settings,
        }
    }

    #[test]
    fn test_buffer_sizes() {
        let f = fixture(WorldSettings::default());
        let lod = LodSampler::new(&f.compositor, &f.classifier, &f.settings);
        let chunk = ChunkCoord::new(4, -2, 0);
        assert_eq!(lod.super_lod(chunk).len(), 8 * LOD_CELL_BYTES);
        assert_eq!(lod.lod_six(chunk).len(), 125 * LOD_CELL_BYTES);
    }

    #[test]
    fn test_little_endian_encoding() {
        assert_eq!(encode(&[0x0102, 0x0003]), vec![0x02, 0x01, 0x03, 0x00]);
        assert_eq!(decode(&[0x02, 0x01, 0x03, 0x00, 0xFF]), vec![0x0102, 0x0003]);
    }

    #[test]
    fn test_deep_and_high_chunks() {
        let f = fixture(WorldSettings::default());
        let lod = LodSampler::new(&f.compositor, &f.classifier, &f.settings);

        let sky = decode(&lod.lod_six(ChunkCoord::new(0, 0, 40)));
        assert!(sky.iter().all(|&m| m == material::AIR));

        let deep = decode(&lod.super_lod(ChunkCoord::new(0, 0, -20)));
        assert!(deep.iter().all(|&m| m == material::HELLSTONE));
    }

    #[test]
    fn test_flat_mode_matches_flat_profile() {
        let f = fixture(WorldSettings::flat());
        let lod = LodSampler::new(&f.compositor, &f.classifier, &f.settings);

        let ground = decode(&lod.lod_six(ChunkCoord::new(9, 9, 0)));
        // Cell centres at z = 3, 9, 16, 22, 28 are all stone
        assert!(ground.iter().all(|&m| m == material::STONE));
        let below = decode(&lod.super_lod(ChunkCoord::new(9, 9, -1)));
        assert!(below.iter().all(|&m| m == material::STONE));
        let above = decode(&lod.super_lod(ChunkCoord::new(9, 9, 1)));
        assert!(above.iter().all(|&m| m == material::AIR));
    }
}
