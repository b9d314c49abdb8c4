//! # Biome Classifier
//!
//! Maps climate, elevation and depth to one of a fixed set of biomes.
//!
//! ```text
//! depth:      min(z, height) < -300        => Hell
//!             z < height - 90              => Stone
//! elevation:  height <= sea level          => Ocean
//!             height > 160                 => Alpine
//!             height > 70                  => Highlands
//! low band:   temperature / downfall table => Icy | Snow | Rainforest |
//!                                             Swamp | Forest | Desert | Plains
//! ```
//!
//! Every input reaches exactly one biome. Descriptors are `'static`
//! singletons; classification never allocates.

use crate::block::material::{
    ASH, BASALT, DIRT, GRASS, GRAVEL, HELLSTONE, ICE, JUNGLE_GRASS, LAVA, MUD, MURKY_WATER,
    PERMAFROST, SAND, SANDSTONE, SNOW, STONE, WATER,
};
use crate::noise::{SeedSet, SimplexNoise};

/// Depth below which everything is hell.
pub const HELL_DEPTH: i32 = -300;
/// Distance under the surface where plain stone takes over.
pub const STONE_DEPTH: f64 = 90.0;
/// Heights above this are alpine.
pub const ALPINE_HEIGHT: f64 = 160.0;
/// Heights above this are highlands.
pub const HIGHLAND_HEIGHT: f64 = 70.0;

/// Climate noise wavelength.
const CLIMATE_SCALE: f64 = 900.0;
/// Temperature lost per unit of height.
const LAPSE_RATE: f64 = 0.005;

/// Temperature and downfall at a column, both roughly in [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    /// Warmth; falls with height.
    pub temperature: f64,
    /// Wetness.
    pub downfall: f64,
}

/// Biome ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Deepest band; hellstone and lava.
    Hell,
    /// Deep rock under every other biome.
    Stone,
    /// Columns at or below sea level.
    Ocean,
    /// Snow-capped peaks.
    Alpine,
    /// Rocky uplands.
    Highlands,
    /// Frozen lowland.
    Icy,
    /// Cold lowland.
    Snow,
    /// Hot, wet lowland.
    Rainforest,
    /// Wet lowland.
    Swamp,
    /// Temperate, moist lowland.
    Forest,
    /// Hot, dry lowland.
    Desert,
    /// Everything else.
    Plains,
}

/// Materials and parameters of a biome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeDescriptor {
    /// Display name.
    pub name: &'static str,
    /// Top block of a column.
    pub surface: u16,
    /// Five blocks under the surface.
    pub sub_surface: u16,
    /// Everything deeper.
    pub base: u16,
    /// Fills water columns up to sea level.
    pub water: u16,
    /// Beaches, shorelines and sea floors.
    pub sand: u16,
    /// Base rock is carved where 3D noise exceeds this. Above 1.0 never carves.
    pub air_density: f64,
    /// Water colour as `0xRRGGBB`.
    pub water_tint: u32,
}

const fn descriptor(
    name: &'static str,
    [surface, sub_surface, base, water, sand]: [u16; 5],
    air_density: f64,
    water_tint: u32,
) -> BiomeDescriptor {
    BiomeDescriptor {
        name,
        surface,
        sub_surface,
        base,
        water,
        sand,
        air_density,
        water_tint,
    }
}

static HELL: BiomeDescriptor =
    descriptor("hell", [HELLSTONE, HELLSTONE, HELLSTONE, LAVA, ASH], 0.35, 0xFF_45_00);
static STONE_BIOME: BiomeDescriptor =
    descriptor("stone", [STONE, STONE, BASALT, WATER, GRAVEL], 0.55, 0x3F_76_E4);
static OCEAN: BiomeDescriptor =
    descriptor("ocean", [SAND, SAND, STONE, WATER, SAND], 0.8, 0x3F_76_E4);
static ALPINE: BiomeDescriptor =
    descriptor("alpine", [SNOW, STONE, STONE, ICE, GRAVEL], 0.7, 0x3D_57_D6);
static HIGHLANDS: BiomeDescriptor =
    descriptor("highlands", [GRASS, STONE, STONE, WATER, GRAVEL], 0.65, 0x3F_76_E4);
static ICY: BiomeDescriptor =
    descriptor("icy", [ICE, PERMAFROST, STONE, ICE, GRAVEL], 0.75, 0x39_38_C9);
static SNOWY: BiomeDescriptor =
    descriptor("snow", [SNOW, DIRT, STONE, WATER, SAND], 0.75, 0x3D_57_D6);
static RAINFOREST: BiomeDescriptor =
    descriptor("rainforest", [JUNGLE_GRASS, DIRT, STONE, WATER, SAND], 0.7, 0x14_A2_C5);
static SWAMP: BiomeDescriptor =
    descriptor("swamp", [MUD, DIRT, STONE, MURKY_WATER, MUD], 0.8, 0x61_7B_64);
static FOREST: BiomeDescriptor =
    descriptor("forest", [GRASS, DIRT, STONE, WATER, SAND], 0.7, 0x1E_97_F2);
static DESERT: BiomeDescriptor =
    descriptor("desert", [SAND, SANDSTONE, SANDSTONE, WATER, SAND], 0.7, 0x32_A5_98);
static PLAINS: BiomeDescriptor =
    descriptor("plains", [GRASS, DIRT, STONE, WATER, SAND], 0.7, 0x44_AF_F5);

impl Biome {
    /// Every biome.
    pub const ALL: [Self; 12] = [
        Self::Hell,
        Self::Stone,
        Self::Ocean,
        Self::Alpine,
        Self::Highlands,
        Self::Icy,
        Self::Snow,
        Self::Rainforest,
        Self::Swamp,
        Self::Forest,
        Self::Desert,
        Self::Plains,
    ];

    /// The biome's shared descriptor.
    #[must_use]
    pub fn descriptor(self) -> &'static BiomeDescriptor {
        match self {
            Self::Hell => &HELL,
            Self::Stone => &STONE_BIOME,
            Self::Ocean => &OCEAN,
            Self::Alpine => &ALPINE,
            Self::Highlands => &HIGHLANDS,
            Self::Icy => &ICY,
            Self::Snow => &SNOWY,
            Self::Rainforest => &RAINFOREST,
            Self::Swamp => &SWAMP,
            Self::Forest => &FOREST,
            Self::Desert => &DESERT,
            Self::Plains => &PLAINS,
        }
    }

    /// Pure decision tree. Total over all finite and non-finite inputs.
    #[must_use]
    pub fn select(climate: Climate, z: i32, height: f64, sea_level: i32) -> Self {
        if f64::from(z).min(height) < f64::from(HELL_DEPTH) {
            return Self::Hell;
        }
        if f64::from(z) < height - STONE_DEPTH {
            return Self::Stone;
        }

        if height.is_nan() || height <= f64::from(sea_level) {
            return Self::Ocean;
        }
        if height > ALPINE_HEIGHT {
            return Self::Alpine;
        }
        if height > HIGHLAND_HEIGHT {
            return Self::Highlands;
        }

        let Climate { temperature, downfall } = climate;
        if temperature < -0.55 {
            Self::Icy
        } else if temperature < -0.25 {
            Self::Snow
        } else if downfall > 0.45 {
            if temperature > 0.35 {
                Self::Rainforest
            } else {
                Self::Swamp
            }
        } else if downfall > 0.05 {
            Self::Forest
        } else if temperature > 0.4 && downfall < -0.3 {
            Self::Desert
        } else {
            Self::Plains
        }
    }
}

/// Climate sampling plus biome selection for one world.
pub struct BiomeClassifier {
    temperature: SimplexNoise,
    downfall: SimplexNoise,
    sea_level: i32,
}

impl BiomeClassifier {
    /// Builds the climate layers: temperature from seeds 2 and 3,
    /// downfall from seeds 3 and 4.
    #[must_use]
    pub fn new(seeds: &SeedSet, sea_level: i32) -> Self {
        Self {
            temperature: SimplexNoise::new(seeds.pair(2, 3)),
            downfall: SimplexNoise::new(seeds.pair(3, 4)),
            sea_level,
        }
    }

    /// Sea level the elevation bands are measured against.
    #[must_use]
    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Climate of a column with a surface at `height`.
    #[must_use]
    pub fn climate(&self, x: f64, y: f64, height: f64) -> Climate {
        let sx = x / CLIMATE_SCALE;
        let sy = y / CLIMATE_SCALE;
        Climate {
            temperature: self.temperature.sample(sx, sy) - height * LAPSE_RATE,
            downfall: self.downfall.sample(sx, sy),
        }
    }

    /// Biome of the voxel at world z in a column with surface `height`.
    #[must_use]
    pub fn biome_for(&self, x: f64, y: f64, z: i32, height: f64) -> Biome {
        Biome::select(self.climate(x, y, height), z, height, self.sea_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::material;
    use crate::noise::WorldSeed;

    fn climate(temperature: f64, downfall: f64) -> Climate {
        Climate { temperature, downfall }
    }

    #[test]
    fn test_hell_below_depth() {
        let classifier = BiomeClassifier::new(&SeedSet::from_world(WorldSeed::new(1)), 0);
        for i in 0..50 {
            let x = f64::from(i) * 977.0;
            assert_eq!(classifier.biome_for(x, -x, 0, -400.0), Biome::Hell);
            assert_eq!(classifier.biome_for(x, -x, -450, -400.0), Biome::Hell);
            assert_eq!(classifier.biome_for(x, x, -301, 50.0), Biome::Hell);
        }
    }

    #[test]
    fn test_selection_is_total() {
        let samples = [-5.0, -1.0, -0.6, -0.3, 0.0, 0.1, 0.38, 0.5, 1.0, 5.0, f64::NAN];
        let heights = [-1000.0, -301.0, -10.0, 0.0, 0.5, 60.0, 100.0, 200.0, f64::NAN];
        for &t in &samples {
            for &d in &samples {
                for &h in &heights {
                    for z in [-500, -100, 0, 50, 400] {
                        let biome = Biome::select(climate(t, d), z, h, 0);
                        assert!(Biome::ALL.contains(&biome));
                    }
                }
            }
        }
    }

    #[test]
    fn test_bands() {
        let mild = climate(0.0, 0.0);
        assert_eq!(Biome::select(mild, 0, 0.0, 0), Biome::Ocean);
        assert_eq!(Biome::select(mild, -95, 10.0, 0), Biome::Stone);
        assert_eq!(Biome::select(mild, 200, 200.0, 0), Biome::Alpine);
        assert_eq!(Biome::select(mild, 100, 100.0, 0), Biome::Highlands);
        assert_eq!(Biome::select(mild, 20, 20.0, 0), Biome::Plains);
    }

    #[test]
    fn test_low_band_table() {
        let pick = |t, d| Biome::select(climate(t, d), 10, 10.0, 0);
        assert_eq!(pick(-0.9, 0.0), Biome::Icy);
        assert_eq!(pick(-0.4, 0.9), Biome::Snow);
        assert_eq!(pick(0.6, 0.8), Biome::Rainforest);
        assert_eq!(pick(0.1, 0.8), Biome::Swamp);
        assert_eq!(pick(0.1, 0.2), Biome::Forest);
        assert_eq!(pick(0.7, -0.7), Biome::Desert);
        assert_eq!(pick(0.7, -0.1), Biome::Plains);
    }

    #[test]
    fn test_descriptors_are_singletons() {
        for biome in Biome::ALL {
            assert!(std::ptr::eq(biome.descriptor(), biome.descriptor()));
            assert!(!biome.descriptor().name.is_empty());
        }
        assert_eq!(Biome::Hell.descriptor().water, material::LAVA);
        assert!(Biome::Ocean.descriptor().air_density < 1.0);
    }

    #[test]
    fn test_height_cools_climate() {
        let classifier = BiomeClassifier::new(&SeedSet::from_world(WorldSeed::new(8)), 0);
        let low = classifier.climate(100.0, 200.0, 0.0);
        let high = classifier.climate(100.0, 200.0, 100.0);
        assert!((low.temperature - high.temperature - 0.5).abs() < 1e-9);
        assert_eq!(low.downfall, high.downfall);
    }
}
