//! # Height Compositor
//!
//! Terrain height at a world (x, y) is the sum of several noise layers
//! plus the strongest mountain covering the point:
//!
//! ```text
//! height = ocean            large wavelength, steep drop below the basin threshold
//!        + max(mountains)   ridge networks of every reaching cluster
//!        + hills            medium wavelength, spikes past the hill threshold
//!        + (local_large + local_small) * dampener
//! ```
//!
//! The dampener is 1.0 while its noise stays inside [-0.75, 0.75] and
//! falls linearly outside that band, flattening large regions into gentle
//! rolling ground.
//!
//! Pure: no caching happens here. Ridge networks are shared through the
//! [`RidgeCache`] handed in at construction.

use std::sync::Arc;

use crate::mountain::{MountainData, MountainGrid};
use crate::noise::{SeedSet, SimplexNoise};
use crate::ridge::{RidgeCache, RidgeNetwork, SearchMode, RIDGE_AMPLITUDE};

/// Ocean layer wavelength.
const OCEAN_SCALE: f64 = 1600.0;
/// Ocean values below this fall into basins.
const BASIN_THRESHOLD: f64 = -0.2;
/// Height per unit of ocean noise above the threshold.
const OCEAN_GAIN: f64 = 12.0;
/// Resting height of open land.
const LAND_OFFSET: f64 = 8.0;
/// Height per unit of ocean noise below the threshold.
const BASIN_GAIN: f64 = 150.0;

/// Hill layer wavelength.
const HILL_SCALE: f64 = 400.0;
/// Hill noise magnitude where spikes begin.
const HILL_THRESHOLD: f64 = 0.6;
/// Height per unit of hill noise inside the threshold.
const HILL_GAIN: f64 = 20.0;
/// Height per unit of hill noise beyond the threshold.
const HILL_SPIKE_GAIN: f64 = 90.0;

/// Dampener wavelength.
const DAMPENER_SCALE: f64 = 2000.0;
/// Dampener noise band that leaves local layers untouched.
const DAMPENER_BAND: f64 = 0.75;
/// Smallest dampening factor, reached at noise magnitude 1.
const DAMPENER_FLOOR: f64 = 0.2;

/// Large local layer wavelength and gain.
const LOCAL_LARGE_SCALE: f64 = 220.0;
const LOCAL_LARGE_GAIN: f64 = 18.0;
/// Small local layer wavelength and gain.
const LOCAL_SMALL_SCALE: f64 = 40.0;
const LOCAL_SMALL_GAIN: f64 = 3.0;

/// Composites noise layers and mountains into terrain height.
pub struct HeightCompositor {
    seeds: SeedSet,
    ocean: SimplexNoise,
    hills: SimplexNoise,
    dampener: SimplexNoise,
    local_large: SimplexNoise,
    local_small: SimplexNoise,
    mountains: MountainGrid,
    ridges: Arc<RidgeCache>,
}

impl HeightCompositor {
    /// Builds the noise layers for a seed set.
    #[must_use]
    pub fn new(seeds: SeedSet, ridges: Arc<RidgeCache>) -> Self {
        Self {
            seeds,
            ocean: SimplexNoise::new(seeds.pair(0, 1)),
            hills: SimplexNoise::new(seeds.pair(1, 0)),
            dampener: SimplexNoise::new(seeds.pair(0, 4)),
            local_large: SimplexNoise::new(seeds.pair(4, 1)),
            local_small: SimplexNoise::new(seeds.pair(1, 4)),
            mountains: MountainGrid::new(seeds.world()),
            ridges,
        }
    }

    /// The seed set this compositor was built from.
    #[must_use]
    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    /// The mountain placement grid.
    #[must_use]
    pub fn mountains(&self) -> &MountainGrid {
        &self.mountains
    }

    /// The shared ridge-network cache.
    #[must_use]
    pub fn ridges(&self) -> &Arc<RidgeCache> {
        &self.ridges
    }

    /// Terrain height at a world point.
    ///
    /// `precise` selects the dense ridge search used for chunk population;
    /// LOD and exploratory checks pass `false`.
    #[must_use]
    pub fn height(&self, x: f64, y: f64, precise: bool) -> f64 {
        let nearby = self.mountains.mountains_near(x, y);
        self.height_with(x, y, precise, &nearby)
    }

    /// Terrain height using a pre-fetched cluster list.
    ///
    /// The list may hold clusters that do not reach the point; they
    /// contribute nothing. Passing any superset of
    /// [`MountainGrid::mountains_near`] gives bit-identical results to
    /// [`HeightCompositor::height`].
    #[must_use]
    pub fn height_with(&self, x: f64, y: f64, precise: bool, mountains: &[MountainData]) -> f64 {
        let height = self.ocean_layer(x, y)
            + self.mountain_contribution(x, y, precise, mountains)
            + self.hill_layer(x, y)
            + self.local_layers(x, y);
        debug_assert!(height.is_finite(), "non-finite height at ({x}, {y})");
        height
    }

    /// Strongest mountain contribution at a point; 0 when none reaches.
    #[must_use]
    pub fn mountain_contribution(
        &self,
        x: f64,
        y: f64,
        precise: bool,
        mountains: &[MountainData],
    ) -> f64 {
        let mode = SearchMode::from_precise(precise);
        mountains
            .iter()
            .filter(|m| m.reaches(x, y))
            .map(|m| {
                let ridge = self.network(m).height_at(x, y, mode);
                ridge / RIDGE_AMPLITUDE * m.height_amplitude
            })
            .fold(0.0, f64::max)
    }

    /// Ridge network of a cluster, built on first use.
    #[must_use]
    pub fn network(&self, mountain: &MountainData) -> Arc<RidgeNetwork> {
        let world_seed = self.seeds.world();
        self.ridges
            .get_or_generate(mountain.center, || RidgeNetwork::generate(mountain, world_seed))
    }

    fn ocean_layer(&self, x: f64, y: f64) -> f64 {
        let raw = self.ocean.octaved(x / OCEAN_SCALE, y / OCEAN_SCALE, 3, 0.5, 2.0);
        let shore = BASIN_THRESHOLD * OCEAN_GAIN + LAND_OFFSET;
        if raw < BASIN_THRESHOLD {
            shore + (raw - BASIN_THRESHOLD) * BASIN_GAIN
        } else {
            raw * OCEAN_GAIN + LAND_OFFSET
        }
    }

    fn hill_layer(&self, x: f64, y: f64) -> f64 {
        let raw = self.hills.octaved(x / HILL_SCALE, y / HILL_SCALE, 2, 0.5, 2.0);
        let magnitude = raw.abs();
        let shaped = if magnitude > HILL_THRESHOLD {
            HILL_THRESHOLD * HILL_GAIN + (magnitude - HILL_THRESHOLD) * HILL_SPIKE_GAIN
        } else {
            magnitude * HILL_GAIN
        };
        shaped.copysign(raw)
    }

    /// Factor in `[DAMPENER_FLOOR, 1]` applied to the local layers.
    fn dampener(&self, x: f64, y: f64) -> f64 {
        let raw = self.dampener.sample(x / DAMPENER_SCALE, y / DAMPENER_SCALE).abs();
        if raw <= DAMPENER_BAND {
            1.0
        } else {
            let t = ((raw - DAMPENER_BAND) / (1.0 - DAMPENER_BAND)).min(1.0);
            1.0 - t * (1.0 - DAMPENER_FLOOR)
        }
    }

    fn local_layers(&self, x: f64, y: f64) -> f64 {
        let large = self
            .local_large
            .octaved(x / LOCAL_LARGE_SCALE, y / LOCAL_LARGE_SCALE, 3, 0.5, 2.0)
            * LOCAL_LARGE_GAIN;
        let small = self.local_small.sample(x / LOCAL_SMALL_SCALE, y / LOCAL_SMALL_SCALE)
            * LOCAL_SMALL_GAIN;
        (large + small) * self.dampener(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;

    fn compositor(seed: u64) -> HeightCompositor {
        let ridges = Arc::new(RidgeCache::new("ridge", 8, 64));
        HeightCompositor::new(SeedSet::from_world(WorldSeed::new(seed)), ridges)
    }

    #[test]
    fn test_height_is_deterministic() {
        let a = compositor(42);
        let b = compositor(42);
        for i in 0..200 {
            let x = f64::from(i) * 37.5 - 3000.0;
            let y = f64::from(i) * -11.25 + 500.0;
            assert_eq!(a.height(x, y, true).to_bits(), b.height(x, y, true).to_bits());
            assert_eq!(a.height(x, y, true).to_bits(), a.height(x, y, true).to_bits());
        }
    }

    #[test]
    fn test_seeds_change_terrain() {
        let a = compositor(1);
        let b = compositor(2);
        let differs = (0..50).any(|i| {
            let x = f64::from(i) * 101.0;
            a.height(x, -x, false) != b.height(x, -x, false)
        });
        assert!(differs);
    }

    #[test]
    fn test_superset_list_matches_near_list() {
        let c = compositor(9);
        // A far cluster that cannot reach the probes
        let far = MountainData {
            center: (1_000_000, 1_000_000),
            height_amplitude: 300.0,
            radius: 400.0,
        };
        for i in 0..40 {
            let x = f64::from(i) * 53.0;
            let y = f64::from(i) * 29.0;
            let mut list = c.mountains().mountains_near(x, y);
            list.push(far);
            assert_eq!(
                c.height(x, y, true).to_bits(),
                c.height_with(x, y, true, &list).to_bits()
            );
        }
    }

    #[test]
    fn test_mountains_raise_terrain() {
        let c = compositor(77);
        let mountain = c.mountains().cell_mountains(0, 0)[0];
        let (mx, my) = (f64::from(mountain.center.0), f64::from(mountain.center.1));

        let contribution = c.mountain_contribution(mx, my, true, &[mountain]);
        assert!(contribution > 0.0);
        assert!(contribution <= mountain.height_amplitude);
        assert_eq!(c.mountain_contribution(mx + 5000.0, my, true, &[mountain]), 0.0);
    }

    #[test]
    fn test_layer_ranges() {
        let c = compositor(3);
        for i in 0..100 {
            let x = f64::from(i) * 211.0;
            let y = f64::from(i) * 97.0;
            let d = c.dampener(x, y);
            assert!((DAMPENER_FLOOR..=1.0).contains(&d));
            assert!(c.hill_layer(x, y).abs() <= HILL_THRESHOLD * HILL_GAIN + HILL_SPIKE_GAIN);
            assert!(c.ocean_layer(x, y) <= OCEAN_GAIN + LAND_OFFSET);
        }
    }

    #[test]
    fn test_adjacent_columns_are_continuous() {
        let c = compositor(5);
        for i in 0..300 {
            let x = f64::from(i * 32 - 1) + 640.0;
            let y = f64::from(i) * 13.0;
            let here = c.height_with(x, y, true, &[]);
            let next = c.height_with(x + 1.0, y, true, &[]);
            assert!((here - next).abs() < 8.0, "seam at ({x}, {y}): {here} vs {next}");
        }
    }
}
