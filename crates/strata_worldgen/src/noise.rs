//! # Coherent Noise
//!
//! Deterministic 2D/3D simplex noise plus the seed plumbing that keeps
//! independent layers decorrelated.
//!
//! ## Determinism Guarantee
//!
//! Given the same `SeedSet`, every sampler built from it produces
//! **exactly** the same values on any platform, any time.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Number of independent seeds in a [`SeedSet`].
pub const SEED_COUNT: usize = 5;

/// Five independent seeds derived once from the world seed.
///
/// Noise layers pick one or two slots so that, for example, temperature
/// and elevation are never spatially correlated. Immutable for the life
/// of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedSet {
    seeds: [i64; SEED_COUNT],
}

impl SeedSet {
    /// Derives the five seeds from a world seed.
    #[must_use]
    pub const fn from_world(world: WorldSeed) -> Self {
        let mut seeds = [0i64; SEED_COUNT];
        let mut i = 0;
        while i < SEED_COUNT {
            seeds[i] = world.derive(0x5EED_0000 + i as u64).value() as i64;
            i += 1;
        }
        Self { seeds }
    }

    /// Wraps explicit seed values (tests, replays of recorded worlds).
    #[must_use]
    pub const fn from_raw(seeds: [i64; SEED_COUNT]) -> Self {
        Self { seeds }
    }

    /// Returns the seed in slot `index` (0..5).
    ///
    /// # Panics
    ///
    /// Panics if `index >= SEED_COUNT`.
    #[inline]
    #[must_use]
    pub const fn get(&self, index: usize) -> i64 {
        self.seeds[index]
    }

    /// The seed used for world-level hashing (mountain grid, chunk RNG).
    #[inline]
    #[must_use]
    pub const fn world(&self) -> i64 {
        self.seeds[0]
    }

    /// Combines two slots into one layer seed.
    ///
    /// `pair(2, 3)` is the seed behind `noise(seed2, seed3, x, y)`.
    #[inline]
    #[must_use]
    pub const fn pair(&self, a: usize, b: usize) -> WorldSeed {
        WorldSeed::new(self.seeds[a] as u64).derive(self.seeds[b] as u64)
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle with xorshift64
        let mut rng_state = seed.value() | 1;
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state as usize) % (i + 1);
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        self.perm[index & 511] as usize
    }
}

/// 12 gradients for 2D simplex (regular 12-gon, axis and diagonal).
const GRAD2: [[f64; 2]; 12] = [
    [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [-1.0, 1.0],
    [-1.0, 0.0], [-1.0, -1.0], [0.0, -1.0], [1.0, -1.0],
    [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0],
];

/// Cube edge midpoints for 3D simplex.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [1.0, 0.0, -1.0], [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, -1.0, -1.0],
];

/// Simplex noise generator.
///
/// Produces smooth, continuous values in the range [-1, 1]. Pure and
/// side-effect free; safe to share between worker threads.
///
/// # Example
///
/// ```rust
/// use strata_worldgen::noise::{SimplexNoise, WorldSeed};
///
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
pub struct SimplexNoise {
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6
    /// Skewing factor for 3D.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for 3D.
    const G3: f64 = 1.0 / 6.0;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise, range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Upper or lower triangle
        let (i1, j1): (u8, u8) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj));
        let gi1 = p.get(ii + usize::from(i1) + p.get(jj + usize::from(j1)));
        let gi2 = p.get(ii + 1 + p.get(jj + 1));

        let n0 = corner2(x0, y0, gi0);
        let n1 = corner2(x1, y1, gi1);
        let n2 = corner2(x2, y2, gi2);

        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Samples 3D simplex noise, range [-1, 1].
    ///
    /// Used for carving voids out of base rock.
    #[must_use]
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        let unskew = f64::from(i + j + k) * Self::G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // Which of the six tetrahedra we are in
        let (i1, j1, k1, i2, j2, k2): (u8, u8, u8, u8, u8, u8) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - f64::from(i1) + Self::G3;
        let y1 = y0 - f64::from(j1) + Self::G3;
        let z1 = z0 - f64::from(k1) + Self::G3;
        let x2 = x0 - f64::from(i2) + 2.0 * Self::G3;
        let y2 = y0 - f64::from(j2) + 2.0 * Self::G3;
        let z2 = z0 - f64::from(k2) + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj + p.get(kk)));
        let (i1, j1, k1) = (usize::from(i1), usize::from(j1), usize::from(k1));
        let (i2, j2, k2) = (usize::from(i2), usize::from(j2), usize::from(k2));
        let gi1 = p.get(ii + i1 + p.get(jj + j1 + p.get(kk + k1)));
        let gi2 = p.get(ii + i2 + p.get(jj + j2 + p.get(kk + k2)));
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1)));

        let n0 = corner3(x0, y0, z0, gi0);
        let n1 = corner3(x1, y1, z1, gi1);
        let n2 = corner3(x2, y2, z2, gi2);
        let n3 = corner3(x3, y3, z3, gi3);

        (32.0 * (n0 + n1 + n2 + n3)).clamp(-1.0, 1.0)
    }

    /// Generates octaved (fractal) 2D noise, roughly [-1, 1].
    ///
    /// # Arguments
    ///
    /// * `octaves` - Number of noise layers
    /// * `persistence` - Amplitude decay per octave
    /// * `lacunarity` - Frequency increase per octave
    #[must_use]
    pub fn octaved(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        total / max_amplitude
    }
}

#[inline]
fn corner2(x: f64, y: f64, hash: usize) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let g = GRAD2[hash % 12];
        let t2 = t * t;
        t2 * t2 * (x * g[0] + y * g[1])
    }
}

#[inline]
fn corner3(x: f64, y: f64, z: f64, hash: usize) -> f64 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let g = GRAD3[hash % 12];
        let t2 = t * t;
        t2 * t2 * (x * g[0] + y * g[1] + z * g[2])
    }
}

/// Fast floor function.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) { xi - 1 } else { xi }
}
