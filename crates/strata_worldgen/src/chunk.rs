//! # Chunk System
//!
//! The world is a grid of `CHUNK_SIZE`³ cubes addressed by integer
//! `(cx, cy, cz)`. Z is vertical; terrain height is a function of (x, y).
//!
//! ## Block Order
//!
//! Blocks are stored row-major with x fastest:
//! `index = x + y * CHUNK_SIZE + z * CHUNK_SIZE²`.

use crate::block::Block;

/// Chunk edge length in blocks.
pub const CHUNK_SIZE: usize = 32;

/// Chunk edge length as a signed world distance.
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Blocks per chunk column slice.
pub const BLOCKS_PER_LAYER: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Total blocks per chunk.
pub const BLOCKS_PER_CHUNK: usize = BLOCKS_PER_LAYER * CHUNK_SIZE;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Y coordinate (in chunks, not blocks).
    pub y: i32,
    /// Z coordinate (vertical, in chunks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Converts integer block coordinates to the containing chunk.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_y: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE_I32),
            y: block_y.div_euclid(CHUNK_SIZE_I32),
            z: block_z.div_euclid(CHUNK_SIZE_I32),
        }
    }

    /// Converts a real world position: `floor(pos / CHUNK_SIZE)` per axis.
    #[inline]
    #[must_use]
    pub fn from_world_pos(x: f64, y: f64, z: f64) -> Self {
        let size = f64::from(CHUNK_SIZE_I32);
        Self {
            x: (x / size).floor() as i32,
            y: (y / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// World X of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE_I32
    }

    /// World Y of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_y(self) -> i32 {
        self.y * CHUNK_SIZE_I32
    }

    /// World Z of the chunk's lowest layer.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE_I32
    }

    /// The column this chunk belongs to.
    #[inline]
    #[must_use]
    pub const fn column(self) -> ColumnCoord {
        ColumnCoord::new(self.x, self.y)
    }

    /// Returns the chunk offset by whole chunks.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// A vertical column of chunks, `(cx, cy)` with z ignored.
///
/// Height maps are keyed by column and shared by every z-slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnCoord {
    /// X coordinate (in chunks).
    pub x: i32,
    /// Y coordinate (in chunks).
    pub y: i32,
}

impl ColumnCoord {
    /// Creates a new column coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column containing an integer block position.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_y: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE_I32),
            y: block_y.div_euclid(CHUNK_SIZE_I32),
        }
    }

    /// World X of the column's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE_I32
    }

    /// World Y of the column's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_y(self) -> i32 {
        self.y * CHUNK_SIZE_I32
    }

    /// World-space centre of the column.
    #[inline]
    #[must_use]
    pub fn center(self) -> (f64, f64) {
        let half = f64::from(CHUNK_SIZE_I32) * 0.5;
        (
            f64::from(self.world_x()) + half,
            f64::from(self.world_y()) + half,
        )
    }
}

/// A chunk of voxels.
#[derive(Clone)]
pub struct Chunk {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    /// Block data, see the module docs for the order.
    blocks: Box<[Block]>,
    /// Whether the populator has filled this chunk.
    pub populated: bool,
}

impl Chunk {
    /// Creates a new all-air, unpopulated chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![Block::AIR; BLOCKS_PER_CHUNK].into_boxed_slice(),
            populated: false,
        }
    }

    /// Linear index of local coordinates.
    #[inline]
    #[must_use]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        x + y * CHUNK_SIZE + z * BLOCKS_PER_LAYER
    }

    /// Gets a block at local coordinates; out of range reads as air.
    #[inline]
    #[must_use]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        if x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE {
            self.blocks[Self::index(x, y, z)]
        } else {
            Block::AIR
        }
    }

    /// Sets a block at local coordinates; out of range writes are dropped.
    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        if x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE {
            self.blocks[Self::index(x, y, z)] = block;
        }
    }

    /// Writes a generated block unless gameplay has locked the target.
    ///
    /// Returns true if the write happened.
    #[inline]
    pub fn set_generated(&mut self, x: usize, y: usize, z: usize, block: Block) -> bool {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return false;
        }
        let slot = &mut self.blocks[Self::index(x, y, z)];
        if slot.is_locked() {
            return false;
        }
        *slot = block;
        true
    }

    /// Marks a block with gameplay flags.
    pub fn add_flags(&mut self, x: usize, y: usize, z: usize, flags: u8) {
        if x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE {
            self.blocks[Self::index(x, y, z)].flags |= flags;
        }
    }

    /// All blocks in storage order.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable blocks in storage order.
    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Raw in-memory bytes (flags included), for hashing and comparisons.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks[..])
    }

    /// Encodes the chunk as `{material:u16 LE, shape, paint, damage}` per
    /// block, in storage order.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCKS_PER_CHUNK * Block::ENCODED_SIZE);
        for block in self.blocks.iter() {
            block.encode_into(&mut out);
        }
        out
    }
}
