//! Deterministic per-call random streams.
//!
//! Nothing in the generator shares a random source. Every consumer builds
//! its own `ChaCha8Rng` from a key (cell, chunk, cluster centre) mixed with
//! the world seed, so results never depend on call order or thread.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The generator's random stream type.
pub type WorldRng = ChaCha8Rng;

/// Builds a fresh stream from a 64-bit seed.
#[inline]
#[must_use]
pub fn seeded_rng(seed: u64) -> WorldRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Mixes a 2D key and a world seed into one 64-bit stream seed.
#[inline]
#[must_use]
pub fn mix(a: i64, b: i64, world: i64) -> u64 {
    let mut h = (a as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (b as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = h.rotate_left(31) ^ (world as u64);
    // splitmix64 finaliser
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}
