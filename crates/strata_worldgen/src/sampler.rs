//! # Column Sampling
//!
//! The one place that turns a height and a biome into layered materials.
//! The chunk populator samples every column at full density and then adds
//! carving, slope shapes, shorelines and ores; the LOD samplers use the
//! same routine at 2 or 5 cells per axis. Keeping a single layering rule
//! keeps distant and near terrain from diverging.
//!
//! ## Layers
//!
//! ```text
//!   z >  surface          air, or water up to sea level over a sunken column
//!   z == surface          surface (sand when sunken)
//!   surface-5 <= z < top  sub-surface
//!   z <  surface-5        base rock
//! ```

use crate::biome::{Biome, BiomeClassifier, BiomeDescriptor, Climate};
use crate::block::material;
use crate::chunk::{ChunkCoord, ColumnCoord, CHUNK_SIZE, CHUNK_SIZE_I32};
use crate::config::WorldSettings;

/// Depth of the sub-surface band.
pub const SUB_SURFACE_DEPTH: i32 = 5;

/// Flat debug worlds: grass on top of chunk layer 0.
const FLAT_TOP: i32 = CHUNK_SIZE_I32 - 1;
/// Dirt layers under the flat grass.
const FLAT_DIRT: i32 = 2;

/// Which band of a column a voxel falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Above the surface.
    Air,
    /// Above a sunken surface, at or below sea level.
    Water,
    /// The surface voxel.
    Surface,
    /// The band under the surface.
    SubSurface,
    /// Everything deeper.
    Base,
}

/// A resolved voxel before carving and shaping.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    /// Layer band.
    pub layer: Layer,
    /// Biome at this voxel.
    pub biome: &'static BiomeDescriptor,
    /// Material before any carving.
    pub material: u16,
}

/// Height and climate of one world column.
#[derive(Clone, Copy, Debug)]
pub struct ColumnSample {
    /// World x.
    pub x: i32,
    /// World y.
    pub y: i32,
    /// Exact surface height.
    pub height: f64,
    /// World z of the surface voxel, `round(height)`.
    ///
    /// Rounded in world space, not relative to the chunk's base z, so every
    /// z-slice of a column agrees. `f64::round` takes ties away from zero,
    /// so a height of `-3.5` surfaces at `-4`.
    pub surface: i32,
    /// Column climate.
    pub climate: Climate,
}

impl ColumnSample {
    /// Samples climate for a column whose height is already known.
    #[must_use]
    pub fn new(classifier: &BiomeClassifier, x: i32, y: i32, height: f64) -> Self {
        debug_assert!(height.is_finite(), "non-finite height at ({x}, {y})");
        Self {
            x,
            y,
            height,
            surface: height.round() as i32,
            climate: classifier.climate(f64::from(x), f64::from(y), height),
        }
    }

    /// Returns true if the surface is at or below sea level.
    #[inline]
    #[must_use]
    pub fn is_sunken(&self, sea_level: i32) -> bool {
        self.surface <= sea_level
    }

    /// Layer band of world z.
    #[must_use]
    pub fn layer(&self, z: i32, sea_level: i32) -> Layer {
        if z > self.surface {
            if self.is_sunken(sea_level) && z <= sea_level {
                Layer::Water
            } else {
                Layer::Air
            }
        } else if z == self.surface {
            Layer::Surface
        } else if z >= self.surface - SUB_SURFACE_DEPTH {
            Layer::SubSurface
        } else {
            Layer::Base
        }
    }

    /// Biome of world z in this column.
    #[inline]
    #[must_use]
    pub fn biome(&self, z: i32, sea_level: i32) -> Biome {
        Biome::select(self.climate, z, self.height, sea_level)
    }

    /// Layer, biome and plain material of world z.
    #[must_use]
    pub fn cell(&self, z: i32, settings: &WorldSettings) -> Cell {
        let layer = self.layer(z, settings.sea_level);
        let biome = self.biome(z, settings.sea_level).descriptor();
        let material = if z > settings.max_non_air_height {
            material::AIR
        } else {
            match layer {
                Layer::Air => material::AIR,
                Layer::Water => biome.water,
                Layer::Surface if self.is_sunken(settings.sea_level) => biome.sand,
                Layer::Surface => biome.surface,
                Layer::SubSurface => biome.sub_surface,
                Layer::Base => biome.base,
            }
        };
        Cell { layer, biome, material }
    }
}

/// Material of world z in a flat debug world.
#[must_use]
pub const fn flat_material(z: i32) -> u16 {
    if z > FLAT_TOP {
        material::AIR
    } else if z == FLAT_TOP {
        material::GRASS
    } else if z >= FLAT_TOP - FLAT_DIRT {
        material::DIRT
    } else {
        material::STONE
    }
}

/// Local offset of cell `index` when a chunk axis is split into `cells`.
///
/// Cells are sampled at their centre, rounded down; at full density the
/// offset is the index itself.
#[inline]
#[must_use]
pub fn cell_offset(index: usize, cells: usize) -> i32 {
    ((2 * index + 1) * CHUNK_SIZE / (2 * cells.max(1))) as i32
}

/// Samples `cells × cells` columns of a chunk column, x fastest.
///
/// `height` maps world (x, y) to a surface height; the populator reads its
/// height map, the LOD samplers call the compositor.
pub fn sample_columns<F>(
    classifier: &BiomeClassifier,
    column: ColumnCoord,
    cells: usize,
    height: F,
) -> Vec<ColumnSample>
where
    F: Fn(i32, i32) -> f64,
{
    let mut out = Vec::with_capacity(cells * cells);
    for j in 0..cells {
        let y = column.world_y() + cell_offset(j, cells);
        for i in 0..cells {
            let x = column.world_x() + cell_offset(i, cells);
            out.push(ColumnSample::new(classifier, x, y, height(x, y)));
        }
    }
    out
}

/// Plain materials of a `cells³` grid over a chunk, z-major then y then x.
///
/// `samples` must come from [`sample_columns`] with the same `cells`.
#[must_use]
pub fn sample_materials(
    samples: &[ColumnSample],
    chunk: ChunkCoord,
    cells: usize,
    settings: &WorldSettings,
) -> Vec<u16> {
    debug_assert_eq!(samples.len(), cells * cells);
    let mut out = Vec::with_capacity(cells * cells * cells);
    for k in 0..cells {
        let z = chunk.world_z() + cell_offset(k, cells);
        for sample in samples {
            let material = if settings.flat_debug_mode {
                flat_material(z)
            } else {
                sample.cell(z, settings).material
            };
            out.push(material);
        }
    }
    out
}
