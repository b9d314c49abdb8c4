//! # Blocks
//!
//! The voxel record written by the populator, the material ids it uses,
//! and the shape codes that turn stair-stepped terrain into slopes.

use bytemuck::{Pod, Zeroable};

/// Material ids.
pub mod material {
    /// Empty space.
    pub const AIR: u16 = 0;
    /// Plain rock.
    pub const STONE: u16 = 1;
    /// Soil below grass.
    pub const DIRT: u16 = 2;
    /// Temperate surface cover.
    pub const GRASS: u16 = 3;
    /// Beaches, desert, lake beds.
    pub const SAND: u16 = 4;
    /// Fresh and sea water.
    pub const WATER: u16 = 5;
    /// Snow cover.
    pub const SNOW: u16 = 6;
    /// Frozen water and icy ground.
    pub const ICE: u16 = 7;
    /// Loose rock on high slopes and sea floors.
    pub const GRAVEL: u16 = 8;
    /// Swamp ground.
    pub const MUD: u16 = 9;
    /// Rainforest floor.
    pub const JUNGLE_GRASS: u16 = 10;
    /// Desert sub-surface.
    pub const SANDSTONE: u16 = 11;
    /// Frozen soil.
    pub const PERMAFROST: u16 = 12;
    /// Deep rock.
    pub const BASALT: u16 = 13;
    /// Rock of the deepest band.
    pub const HELLSTONE: u16 = 14;
    /// Molten rock; the hell biome's "water".
    pub const LAVA: u16 = 15;
    /// Swamp water.
    pub const MURKY_WATER: u16 = 16;
    /// Shallow ore.
    pub const COAL_ORE: u16 = 17;
    /// Mid-depth ore.
    pub const IRON_ORE: u16 = 18;
    /// Deep ore.
    pub const GOLD_ORE: u16 = 19;
    /// Ash beaches of the hell biome.
    pub const ASH: u16 = 20;

    /// Returns true for rock an ore vein may replace.
    #[inline]
    #[must_use]
    pub const fn is_host_rock(id: u16) -> bool {
        matches!(id, STONE | BASALT | HELLSTONE | SANDSTONE)
    }

    /// Returns true for materials that fill space without being solid.
    #[inline]
    #[must_use]
    pub const fn is_fluid(id: u16) -> bool {
        matches!(id, WATER | MURKY_WATER | LAVA)
    }
}

/// Horizontal neighbour direction. `North` is +y, `East` is +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// +y
    North = 0,
    /// +x
    East = 1,
    /// -y
    South = 2,
    /// -x
    West = 3,
}

impl Direction {
    /// All four directions in bit order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit offset `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Shape of a voxel.
///
/// `Full` plus twelve slope shapes are chosen from neighbour heights at
/// the terrain surface. `Rounded` marks thin rims next to carved voids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shape {
    /// Solid cube.
    Full = 0,
    /// Wedge descending towards +y.
    SlopeNorth = 1,
    /// Wedge descending towards +x.
    SlopeEast = 2,
    /// Wedge descending towards -y.
    SlopeSouth = 3,
    /// Wedge descending towards -x.
    SlopeWest = 4,
    /// Convex corner descending towards +x+y.
    OuterNorthEast = 5,
    /// Convex corner descending towards -x+y.
    OuterNorthWest = 6,
    /// Convex corner descending towards +x-y.
    OuterSouthEast = 7,
    /// Convex corner descending towards -x-y.
    OuterSouthWest = 8,
    /// Concave corner rising towards +x+y.
    InnerNorthEast = 9,
    /// Concave corner rising towards -x+y.
    InnerNorthWest = 10,
    /// Concave corner rising towards +x-y.
    InnerSouthEast = 11,
    /// Concave corner rising towards -x-y.
    InnerSouthWest = 12,
    /// Rounded rim between solid rock and a carved void.
    Rounded = 13,
}

impl Shape {
    /// Number of shapes selectable from neighbour heights.
    pub const SURFACE_SHAPES: usize = 13;

    /// Picks the surface shape from which neighbours are lower and higher.
    ///
    /// Masks use one bit per [`Direction`]. Every combination maps to
    /// exactly one of the thirteen surface shapes.
    #[must_use]
    pub const fn from_neighbours(lower: u8, higher: u8) -> Self {
        const N: u8 = Direction::North.bit();
        const E: u8 = Direction::East.bit();
        const S: u8 = Direction::South.bit();
        const W: u8 = Direction::West.bit();

        match lower & 0b1111 {
            0 => match higher & 0b1111 {
                x if x == N | E => Self::InnerNorthEast,
                x if x == N | W => Self::InnerNorthWest,
                x if x == S | E => Self::InnerSouthEast,
                x if x == S | W => Self::InnerSouthWest,
                _ => Self::Full,
            },
            x if x == N => Self::SlopeNorth,
            x if x == E => Self::SlopeEast,
            x if x == S => Self::SlopeSouth,
            x if x == W => Self::SlopeWest,
            x if x == N | E => Self::OuterNorthEast,
            x if x == N | W => Self::OuterNorthWest,
            x if x == S | E => Self::OuterSouthEast,
            x if x == S | W => Self::OuterSouthWest,
            // Three sides fall away: slope away from the one that holds
            x if x == N | E | W => Self::SlopeNorth,
            x if x == E | N | S => Self::SlopeEast,
            x if x == S | E | W => Self::SlopeSouth,
            x if x == W | N | S => Self::SlopeWest,
            // Ridges (opposite sides) and pinnacles stay full
            _ => Self::Full,
        }
    }

    /// Returns the neighbour mask bit for a direction.
    #[inline]
    #[must_use]
    pub const fn mask(direction: Direction) -> u8 {
        direction.bit()
    }
}

/// Block was changed by gameplay; generation must not overwrite it.
pub const FLAG_EDITED: u8 = 0b0000_0001;
/// Block is protected (claims, spawn); generation must not overwrite it.
pub const FLAG_PROTECTED: u8 = 0b0000_0010;

/// A single voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Block {
    /// Material id (see [`material`]).
    pub material: u16,
    /// Shape code (see [`Shape`]).
    pub shape: u8,
    /// Paint byte, 0 = unpainted.
    pub paint: u8,
    /// Damage code, 0 = intact.
    pub damage: u8,
    /// Gameplay flags ([`FLAG_EDITED`], [`FLAG_PROTECTED`]). Not exported.
    pub flags: u8,
}

impl Block {
    /// Air block (empty).
    pub const AIR: Self = Self::new(material::AIR);
    /// Stone block.
    pub const STONE: Self = Self::new(material::STONE);
    /// Dirt block.
    pub const DIRT: Self = Self::new(material::DIRT);
    /// Grass block.
    pub const GRASS: Self = Self::new(material::GRASS);

    /// Encoded size of one block on the wire (flags excluded).
    pub const ENCODED_SIZE: usize = 5;

    /// Creates a full, unpainted, undamaged block.
    #[inline]
    #[must_use]
    pub const fn new(material: u16) -> Self {
        Self {
            material,
            shape: Shape::Full as u8,
            paint: 0,
            damage: 0,
            flags: 0,
        }
    }

    /// Creates a block with a shape.
    #[inline]
    #[must_use]
    pub const fn shaped(material: u16, shape: Shape) -> Self {
        Self {
            shape: shape as u8,
            ..Self::new(material)
        }
    }

    /// Returns true if this is an air block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.material == material::AIR
    }

    /// Returns true if gameplay marked this block edited or protected.
    #[inline]
    #[must_use]
    pub const fn is_locked(self) -> bool {
        self.flags & (FLAG_EDITED | FLAG_PROTECTED) != 0
    }

    /// Appends `{material:u16 LE, shape, paint, damage}`.
    #[inline]
    pub fn encode_into(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.material.to_le_bytes());
        out.push(self.shape);
        out.push(self.paint);
        out.push(self.damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        assert_eq!(std::mem::size_of::<Block>(), 6);
        let mut out = Vec::new();
        Block::shaped(0x0102, Shape::OuterSouthWest).encode_into(&mut out);
        assert_eq!(out, vec![0x02, 0x01, Shape::OuterSouthWest as u8, 0, 0]);
        assert_eq!(out.len(), Block::ENCODED_SIZE);
    }

    #[test]
    fn test_every_mask_pair_maps_to_a_surface_shape() {
        for lower in 0..16u8 {
            for higher in 0..16u8 {
                if lower & higher != 0 {
                    continue;
                }
                let shape = Shape::from_neighbours(lower, higher);
                assert!((shape as usize) < Shape::SURFACE_SHAPES, "{lower:04b}/{higher:04b}");
            }
        }
    }

    #[test]
    fn test_shape_selection() {
        let n = Shape::mask(Direction::North);
        let e = Shape::mask(Direction::East);
        let s = Shape::mask(Direction::South);
        let w = Shape::mask(Direction::West);

        assert_eq!(Shape::from_neighbours(0, 0), Shape::Full);
        assert_eq!(Shape::from_neighbours(e, 0), Shape::SlopeEast);
        assert_eq!(Shape::from_neighbours(n | e, 0), Shape::OuterNorthEast);
        assert_eq!(Shape::from_neighbours(n | s, 0), Shape::Full);
        assert_eq!(Shape::from_neighbours(n | e | s | w, 0), Shape::Full);
        assert_eq!(Shape::from_neighbours(s | e | w, n), Shape::SlopeSouth);
        assert_eq!(Shape::from_neighbours(0, s | w), Shape::InnerSouthWest);
    }

    #[test]
    fn test_locked_flags() {
        let mut block = Block::STONE;
        assert!(!block.is_locked());
        block.flags |= FLAG_PROTECTED;
        assert!(block.is_locked());
    }
}
