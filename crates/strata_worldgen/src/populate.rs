//! # Chunk Populator
//!
//! Fills a chunk's voxels from its column's height map:
//!
//! 1. layered materials from [`ColumnSample::cell`]
//! 2. voids carved out of base rock where 3D noise beats the biome's
//!    air density, with `Rounded` rims on the solid side
//! 3. one of 13 surface shapes per column from its four neighbours
//! 4. water over sunken columns, a sand block at sea level on shorelines
//! 5. ore veins, exchanged with already populated neighbour chunks
//! 6. tree-spawn requests for candidates whose surface is in this chunk
//!
//! Flat debug worlds skip all of it.
//!
//! ## Neighbour Chunks
//!
//! Everything about a neighbour that affects this chunk (its heights,
//! its voids, its ore veins) is recomputed, never read, so results do not
//! depend on which chunk populates first. A vein cell that falls in a
//! neighbour is also written through the [`ChunkStore`] when that
//! neighbour is already populated; it already holds the same cell, so
//! the write only matters where gameplay touched the block since, and
//! edited or protected blocks are never overwritten.
//!
//! ## Lock Order
//!
//! The populator locks at most one neighbour handle at a time and only
//! for the duration of its writes. The chunk being populated must not be
//! locked through the store while this runs: populate it off-store and
//! publish it afterwards, as [`WorldGenerator::generate_and_publish`]
//! does.
//!
//! [`WorldGenerator::generate_and_publish`]: crate::generator::WorldGenerator::generate_and_publish

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;

use crate::biome::BiomeClassifier;
use crate::block::{material, Block, Direction, Shape};
use crate::chunk::{
    Chunk, ChunkCoord, ColumnCoord, BLOCKS_PER_CHUNK, CHUNK_SIZE, CHUNK_SIZE_I32,
};
use crate::config::WorldSettings;
use crate::height::HeightCompositor;
use crate::heightmap::{HeightMap, HeightMapCache};
use crate::noise::SimplexNoise;
use crate::random::{mix, seeded_rng};
use crate::sampler::{flat_material, sample_columns, ColumnSample, Layer};
use crate::store::ChunkStore;

/// Horizontal and vertical carve noise wavelengths.
const CARVE_SCALE_XY: f64 = 28.0;
const CARVE_SCALE_Z: f64 = 18.0;

/// Salt separating the ore stream from other per-chunk streams.
const ORE_SALT: i64 = 0x0E5E_0E5E;
/// Veins started per chunk.
const VEINS_PER_CHUNK: std::ops::RangeInclusive<u32> = 2..=6;
/// Steps per vein.
const VEIN_LENGTH: std::ops::RangeInclusive<u32> = 6..=14;
/// Coal above this depth, iron above the next.
const COAL_DEPTH: i32 = -32;
const IRON_DEPTH: i32 = -160;

/// Distinct tree variants a request may ask for.
pub const TREE_VARIANTS: u64 = 8;

/// A request for the tree generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSpawnRequest {
    /// World position of the surface voxel the tree stands on.
    pub world_position: (i32, i32, i32),
    /// Variant in `0..TREE_VARIANTS`.
    pub tree_variant: u32,
}

/// One ore voxel of a vein, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VeinCell {
    position: (i32, i32, i32),
    ore: u16,
}

/// Neighbour columns just outside a chunk, one strip per side.
struct EdgeSamples {
    north: Vec<ColumnSample>,
    south: Vec<ColumnSample>,
    east: Vec<ColumnSample>,
    west: Vec<ColumnSample>,
}

/// Column samples of a chunk plus its edge strips.
struct Columns {
    map: Arc<HeightMap>,
    inner: Vec<ColumnSample>,
    edges: EdgeSamples,
}

impl Columns {
    /// Sample at local (x, y), where one of them may be -1 or `CHUNK_SIZE`.
    fn at(&self, x: i32, y: i32) -> &ColumnSample {
        let size = CHUNK_SIZE_I32;
        if x < 0 {
            &self.edges.west[y as usize]
        } else if x >= size {
            &self.edges.east[y as usize]
        } else if y < 0 {
            &self.edges.south[x as usize]
        } else if y >= size {
            &self.edges.north[x as usize]
        } else {
            &self.inner[(x + y * size) as usize]
        }
    }
}

/// Fills chunks for one world.
pub struct ChunkPopulator {
    settings: WorldSettings,
    compositor: Arc<HeightCompositor>,
    classifier: Arc<BiomeClassifier>,
    heightmaps: Arc<HeightMapCache>,
    carve: SimplexNoise,
    world_seed: i64,
}

impl ChunkPopulator {
    /// Creates a populator sharing the generator's compositor and caches.
    #[must_use]
    pub fn new(
        settings: WorldSettings,
        compositor: Arc<HeightCompositor>,
        classifier: Arc<BiomeClassifier>,
        heightmaps: Arc<HeightMapCache>,
    ) -> Self {
        let seeds = *compositor.seeds();
        Self {
            settings,
            carve: SimplexNoise::new(seeds.pair(4, 2)),
            world_seed: seeds.world(),
            compositor,
            classifier,
            heightmaps,
        }
    }

    /// Populates `chunk` in place and returns its tree-spawn requests.
    ///
    /// Marks the chunk populated. Blocks already edited or protected keep
    /// their contents.
    pub fn populate(&self, chunk: &mut Chunk, store: &dyn ChunkStore) -> Vec<TreeSpawnRequest> {
        if self.settings.flat_debug_mode {
            self.populate_flat(chunk);
            chunk.populated = true;
            return Vec::new();
        }

        let coord = chunk.coord;
        let columns = self.columns(coord);
        let carved = self.fill(chunk, &columns);
        self.round_rims(chunk, &columns, &carved);
        self.place_ores(chunk, store);
        let trees = self.tree_requests(coord, &columns);

        chunk.populated = true;
        tracing::trace!("populated chunk {:?} ({} trees)", coord, trees.len());
        trees
    }

    /// Grass, two dirt, then stone below the top of chunk layer 0.
    fn populate_flat(&self, chunk: &mut Chunk) {
        let base_z = chunk.coord.world_z();
        for lz in 0..CHUNK_SIZE {
            let block = Block::new(flat_material(base_z + lz as i32));
            for ly in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    chunk.set_generated(lx, ly, lz, block);
                }
            }
        }
    }

    /// Samples the chunk's columns and the strips around it.
    ///
    /// Edge strips come from the neighbouring columns' cached height maps.
    fn columns(&self, coord: ChunkCoord) -> Columns {
        let column = coord.column();
        let map = self.heightmaps.get(&self.compositor, column);
        let (ox, oy) = (column.world_x(), column.world_y());
        let last = CHUNK_SIZE - 1;

        let inner = sample_columns(&self.classifier, column, CHUNK_SIZE, |x, y| {
            map.height((x - ox) as usize, (y - oy) as usize)
        });

        // (dx, dy) of the neighbour column and the local (x, y) of strip cell i
        let strip = |dx: i32, dy: i32, local: fn(usize, usize) -> (usize, usize)| {
            let neighbour = ColumnCoord::new(column.x + dx, column.y + dy);
            let heights = self.heightmaps.get(&self.compositor, neighbour);
            (0..CHUNK_SIZE)
                .map(|i| {
                    let (lx, ly) = local(i, last);
                    let x = neighbour.world_x() + lx as i32;
                    let y = neighbour.world_y() + ly as i32;
                    ColumnSample::new(&self.classifier, x, y, heights.height(lx, ly))
                })
                .collect::<Vec<_>>()
        };
        let edges = EdgeSamples {
            north: strip(0, 1, |i, _| (i, 0)),
            south: strip(0, -1, |i, last| (i, last)),
            east: strip(1, 0, |i, _| (0, i)),
            west: strip(-1, 0, |i, last| (last, i)),
        };

        Columns { map, inner, edges }
    }

    /// Returns true if base rock at world z of this column is carved away.
    fn is_void(&self, sample: &ColumnSample, z: i32) -> bool {
        let cell = sample.cell(z, &self.settings);
        cell.layer == Layer::Base
            && cell.material != material::AIR
            && self.carve_density(sample.x, sample.y, z) > cell.biome.air_density
    }

    #[inline]
    fn carve_density(&self, x: i32, y: i32, z: i32) -> f64 {
        self.carve.sample3(
            f64::from(x) / CARVE_SCALE_XY,
            f64::from(y) / CARVE_SCALE_XY,
            f64::from(z) / CARVE_SCALE_Z,
        )
    }

    /// Surface shape of a column from its four neighbours.
    fn surface_shape(&self, columns: &Columns, lx: i32, ly: i32) -> Shape {
        let own = columns.at(lx, ly).surface;
        let max_slope = self.settings.max_sudden_slope;
        let mut lower = 0u8;
        let mut higher = 0u8;

        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let diff = columns.at(lx + dx, ly + dy).surface - own;
            if (-max_slope..0).contains(&diff) {
                lower |= Shape::mask(direction);
            } else if (1..=max_slope).contains(&diff) {
                higher |= Shape::mask(direction);
            }
        }
        Shape::from_neighbours(lower, higher)
    }

    /// Returns true if a neighbour of a dry column is at or below sea level.
    fn is_shoreline(&self, columns: &Columns, lx: i32, ly: i32) -> bool {
        let sea_level = self.settings.sea_level;
        !columns.at(lx, ly).is_sunken(sea_level)
            && Direction::ALL.iter().any(|d| {
                let (dx, dy) = d.offset();
                columns.at(lx + dx, ly + dy).is_sunken(sea_level)
            })
    }

    /// Layers, carving, surface shapes, water and shoreline sand.
    ///
    /// Returns the carve mask in block order.
    fn fill(&self, chunk: &mut Chunk, columns: &Columns) -> Vec<bool> {
        let base_z = chunk.coord.world_z();
        let sea_level = self.settings.sea_level;
        let mut carved = vec![false; BLOCKS_PER_CHUNK];

        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let (ix, iy) = (lx as i32, ly as i32);
                let sample = columns.at(ix, iy);
                let shape = self.surface_shape(columns, ix, iy);
                let shoreline = self.is_shoreline(columns, ix, iy);

                for lz in 0..CHUNK_SIZE {
                    let z = base_z + lz as i32;
                    let cell = sample.cell(z, &self.settings);
                    let mut block = Block::new(cell.material);
                    let mut void = false;

                    if cell.material != material::AIR {
                        match cell.layer {
                            Layer::Surface => block.shape = shape as u8,
                            Layer::Base if self.is_void(sample, z) => {
                                block = Block::AIR;
                                void = true;
                            }
                            _ => {}
                        }
                        if shoreline && z == sea_level && !void {
                            block = Block::new(cell.biome.sand);
                        }
                    }

                    if chunk.set_generated(lx, ly, lz, block) && void {
                        carved[Chunk::index(lx, ly, lz)] = true;
                    }
                }
            }
        }
        carved
    }

    /// Gives solid blocks touching a void the `Rounded` shape.
    fn round_rims(&self, chunk: &mut Chunk, columns: &Columns, carved: &[bool]) {
        const FACES: [(i32, i32, i32); 6] =
            [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)];

        let base_z = chunk.coord.world_z();
        let sea_level = self.settings.sea_level;
        let size = CHUNK_SIZE_I32;

        for lz in 0..CHUNK_SIZE {
            for ly in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    let block = chunk.get_block(lx, ly, lz);
                    if block.is_air()
                        || material::is_fluid(block.material)
                        || block.shape != Shape::Full as u8
                    {
                        continue;
                    }
                    let (ix, iy, iz) = (lx as i32, ly as i32, lz as i32);
                    let z = base_z + iz;
                    if !matches!(
                        columns.at(ix, iy).layer(z, sea_level),
                        Layer::SubSurface | Layer::Base
                    ) {
                        continue;
                    }

                    let touches_void = FACES.iter().any(|&(dx, dy, dz)| {
                        let (nx, ny, nz) = (ix + dx, iy + dy, iz + dz);
                        let inside = (0..size).contains(&nx)
                            && (0..size).contains(&ny)
                            && (0..size).contains(&nz);
                        if inside {
                            carved[Chunk::index(nx as usize, ny as usize, nz as usize)]
                        } else {
                            self.is_void(columns.at(nx, ny), base_z + nz)
                        }
                    });
                    if touches_void {
                        chunk.set_generated(lx, ly, lz, Block::shaped(block.material, Shape::Rounded));
                    }
                }
            }
        }
    }

    /// Vein cells started by one chunk. Pure in the chunk coordinate.
    fn vein_cells(&self, coord: ChunkCoord) -> Vec<VeinCell> {
        let key = (i64::from(coord.y) << 32) ^ i64::from(coord.z);
        let mut rng = seeded_rng(mix(i64::from(coord.x), key, self.world_seed ^ ORE_SALT));

        let veins = rng.gen_range(VEINS_PER_CHUNK);
        let mut cells = Vec::new();
        for _ in 0..veins {
            let mut position = (
                coord.world_x() + rng.gen_range(0..CHUNK_SIZE_I32),
                coord.world_y() + rng.gen_range(0..CHUNK_SIZE_I32),
                coord.world_z() + rng.gen_range(0..CHUNK_SIZE_I32),
            );
            let ore = ore_for_depth(position.2);
            for _ in 0..rng.gen_range(VEIN_LENGTH) {
                cells.push(VeinCell { position, ore });
                let step = if rng.gen_bool(0.5) { 1 } else { -1 };
                match rng.gen_range(0..3) {
                    0 => position.0 += step,
                    1 => position.1 += step,
                    _ => position.2 += step,
                }
            }
        }
        cells
    }

    /// Writes own veins, then every neighbour's veins that reach into this
    /// chunk, in a fixed order. Own cells that reach out are also written
    /// into neighbours that are already populated.
    ///
    /// Vein cells are pure in their source chunk, so the result does not
    /// depend on which neighbours exist or have been populated.
    fn place_ores(&self, chunk: &mut Chunk, store: &dyn ChunkStore) {
        let coord = chunk.coord;
        let mut outgoing: BTreeMap<ChunkCoord, Vec<VeinCell>> = BTreeMap::new();

        for cell in self.vein_cells(coord) {
            let target = chunk_of(cell.position);
            if target == coord {
                place_ore(chunk, cell);
            } else {
                outgoing.entry(target).or_default().push(cell);
            }
        }

        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy, dz) == (0, 0, 0) {
                        continue;
                    }
                    for cell in self.vein_cells(coord.offset(dx, dy, dz)) {
                        if chunk_of(cell.position) == coord {
                            place_ore(chunk, cell);
                        }
                    }
                }
            }
        }

        // One neighbour lock at a time, never nested
        for (target, cells) in outgoing {
            let Some(handle) = store.load_or_create_no_populate(target) else {
                continue;
            };
            let mut neighbour = handle.lock();
            if !neighbour.populated {
                continue;
            }
            for cell in cells {
                place_ore(&mut neighbour, cell);
            }
        }
    }

    /// Requests for tree candidates standing on dry surface in this chunk.
    fn tree_requests(&self, coord: ChunkCoord, columns: &Columns) -> Vec<TreeSpawnRequest> {
        let bottom = coord.world_z();
        let top = bottom + CHUNK_SIZE_I32;

        columns
            .map
            .trees()
            .iter()
            .filter_map(|tree| {
                let sample = columns.at(i32::from(tree.local.0), i32::from(tree.local.1));
                let z = sample.surface;
                let dry = !sample.is_sunken(self.settings.sea_level);
                let in_chunk = (bottom..top).contains(&z) && z <= self.settings.max_non_air_height;
                (dry && in_chunk).then(|| TreeSpawnRequest {
                    world_position: (sample.x, sample.y, z),
                    tree_variant: (tree.variant_seed % TREE_VARIANTS) as u32,
                })
            })
            .collect()
    }
}

/// Ore for a world depth.
fn ore_for_depth(z: i32) -> u16 {
    if z >= COAL_DEPTH {
        material::COAL_ORE
    } else if z >= IRON_DEPTH {
        material::IRON_ORE
    } else {
        material::GOLD_ORE
    }
}

#[inline]
fn chunk_of(position: (i32, i32, i32)) -> ChunkCoord {
    ChunkCoord::from_block_pos(position.0, position.1, position.2)
}

/// Replaces unlocked host rock with ore, keeping the block's shape.
fn place_ore(chunk: &mut Chunk, cell: VeinCell) {
    let (x, y, z) = cell.position;
    let lx = x.rem_euclid(CHUNK_SIZE_I32) as usize;
    let ly = y.rem_euclid(CHUNK_SIZE_I32) as usize;
    let lz = z.rem_euclid(CHUNK_SIZE_I32) as usize;

    let block = chunk.get_block(lx, ly, lz);
    if material::is_host_rock(block.material) {
        chunk.set_generated(lx, ly, lz, Block { material: cell.ore, ..block });
    }
}
