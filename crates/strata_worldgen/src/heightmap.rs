//! # Height Maps
//!
//! One [`HeightMap`] per chunk column: the `CHUNK_SIZE²` surface heights
//! plus the column's tree-spawn candidates. Every z-slice of the column
//! shares it, so it lives in a [`HeightMapCache`].

use std::sync::Arc;

use rand::Rng;

use crate::cache::StripedCache;
use crate::chunk::{ColumnCoord, CHUNK_SIZE};
use crate::height::HeightCompositor;
use crate::random::{mix, seeded_rng};

/// Salt separating the tree stream from other per-column streams.
const TREE_SALT: i64 = 0x7EE5_7EE5;

/// Most tree candidates per column.
const MAX_TREES: usize = 4;

/// A tree candidate inside a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSpawn {
    /// Local (x, y) in the column.
    pub local: (u8, u8),
    /// Seed the tree generator turns into a variant.
    pub variant_seed: u64,
}

/// Surface heights and tree candidates of one column. Immutable.
#[derive(Clone, Debug)]
pub struct HeightMap {
    column: ColumnCoord,
    heights: Box<[f64]>,
    trees: Vec<TreeSpawn>,
}

impl HeightMap {
    /// Computes the column's heights with the precise ridge search.
    ///
    /// One cluster list is fetched for the whole column.
    #[must_use]
    pub fn generate(compositor: &HeightCompositor, column: ColumnCoord) -> Self {
        let mountains = compositor.mountains().mountains_for_column(column);
        let origin_x = column.world_x();
        let origin_y = column.world_y();

        let mut heights = Vec::with_capacity(CHUNK_SIZE * CHUNK_SIZE);
        for ly in 0..CHUNK_SIZE as i32 {
            for lx in 0..CHUNK_SIZE as i32 {
                let x = f64::from(origin_x + lx);
                let y = f64::from(origin_y + ly);
                heights.push(compositor.height_with(x, y, true, &mountains));
            }
        }

        Self {
            column,
            heights: heights.into_boxed_slice(),
            trees: Self::tree_spawns(column, compositor.seeds().world()),
        }
    }

    /// Deterministic tree candidates for a column.
    fn tree_spawns(column: ColumnCoord, world_seed: i64) -> Vec<TreeSpawn> {
        let mut rng = seeded_rng(mix(
            i64::from(column.x),
            i64::from(column.y),
            world_seed ^ TREE_SALT,
        ));
        let count = rng.gen_range(0..=MAX_TREES);
        (0..count)
            .map(|_| TreeSpawn {
                local: (
                    rng.gen_range(0..CHUNK_SIZE as u8),
                    rng.gen_range(0..CHUNK_SIZE as u8),
                ),
                variant_seed: rng.gen(),
            })
            .collect()
    }

    /// The column this map covers.
    #[must_use]
    pub fn column(&self) -> ColumnCoord {
        self.column
    }

    /// Height at local (x, y).
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is `>= CHUNK_SIZE`.
    #[inline]
    #[must_use]
    pub fn height(&self, x: usize, y: usize) -> f64 {
        assert!(x < CHUNK_SIZE && y < CHUNK_SIZE, "local ({x}, {y}) outside column");
        self.heights[x + y * CHUNK_SIZE]
    }

    /// All heights, x fastest.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Tree candidates.
    #[must_use]
    pub fn trees(&self) -> &[TreeSpawn] {
        &self.trees
    }
}

/// Shared per-column height maps.
pub struct HeightMapCache {
    maps: StripedCache<ColumnCoord, HeightMap>,
}

impl HeightMapCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(stripes: usize, limit: usize) -> Self {
        Self {
            maps: StripedCache::new("heightmap", stripes, limit),
        }
    }

    /// Returns the column's map, generating it at most once.
    #[must_use]
    pub fn get(&self, compositor: &HeightCompositor, column: ColumnCoord) -> Arc<HeightMap> {
        self.maps
            .get_or_generate(column, || HeightMap::generate(compositor, column))
    }

    /// Returns the map only if it is already published.
    #[must_use]
    pub fn cached(&self, column: ColumnCoord) -> Option<Arc<HeightMap>> {
        self.maps.get(&column)
    }

    /// Maintenance tick; see [`StripedCache::maintain`].
    pub fn maintain(&self) -> bool {
        self.maps.maintain()
    }

    /// Number of cached columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Height maps generated since creation.
    #[must_use]
    pub fn generations(&self) -> u64 {
        self.maps.generations()
    }
}
