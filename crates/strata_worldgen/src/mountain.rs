//! # Mountain Placement Grid
//!
//! The world is partitioned into large square cells. Each cell owns one or
//! two root peaks, each followed by a chain of descendant peaks stepping
//! outward at decreasing height. Everything is a closed-form function of
//! the cell and the world seed, so nothing here is cached.
//!
//! Clusters never leave their cell and never reach further than
//! [`MAX_MOUNTAIN_RADIUS`], which is smaller than a cell. A query therefore
//! only has to look at neighbouring cells when it sits within that radius
//! of a cell edge.

use rand::Rng;

use crate::chunk::{ColumnCoord, CHUNK_SIZE_I32};
use crate::random::{seeded_rng, WorldRng};

/// Edge length of a placement cell in world units.
pub const MOUNTAIN_CELL_SIZE: i32 = 2048;

/// Upper bound of any cluster's influence radius.
pub const MAX_MOUNTAIN_RADIUS: f64 = 480.0;

/// Smallest radius a descendant peak shrinks to.
const MIN_MOUNTAIN_RADIUS: f64 = 140.0;

/// Distance a cluster centre keeps from its cell edge.
const CELL_INSET: i32 = 16;

/// Root peak amplitude range (world units above the surrounding terrain).
const ROOT_AMPLITUDE: std::ops::Range<f64> = 120.0..360.0;

/// Root peak radius range.
const ROOT_RADIUS: std::ops::Range<f64> = 260.0..MAX_MOUNTAIN_RADIUS;

/// Descendant height as a fraction of its parent.
const CHILD_HEIGHT_FRACTION: std::ops::Range<f64> = 0.5..1.0;

/// One mountain cluster: where it is, how tall, how far it reaches.
///
/// A cheap value type regenerated on every query; never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MountainData {
    /// Cluster centre in world units.
    pub center: (i32, i32),
    /// Peak height contributed at full ridge strength.
    pub height_amplitude: f64,
    /// Influence radius in world units.
    pub radius: f64,
}

impl MountainData {
    /// Distance from the cluster centre to a world point.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = x - f64::from(self.center.0);
        let dy = y - f64::from(self.center.1);
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns true if the point lies inside the cluster's radius.
    #[inline]
    #[must_use]
    pub fn reaches(&self, x: f64, y: f64) -> bool {
        self.distance_to(x, y) <= self.radius
    }
}

/// Deterministic mountain placement for one world.
#[derive(Clone, Copy, Debug)]
pub struct MountainGrid {
    world_seed: i64,
}

impl MountainGrid {
    /// Creates the grid for a world seed.
    #[must_use]
    pub const fn new(world_seed: i64) -> Self {
        Self { world_seed }
    }

    /// Placement cell containing a world point.
    #[inline]
    #[must_use]
    pub fn cell_of(x: f64, y: f64) -> (i32, i32) {
        let size = f64::from(MOUNTAIN_CELL_SIZE);
        ((x / size).floor() as i32, (y / size).floor() as i32)
    }

    /// Every cluster placed in one cell, roots first then their chains.
    #[must_use]
    pub fn cell_mountains(&self, cell_x: i32, cell_y: i32) -> Vec<MountainData> {
        let seed = i64::from(cell_x)
            .wrapping_mul(39)
            .wrapping_add(i64::from(cell_y))
            .wrapping_add(self.world_seed);
        let mut rng = seeded_rng(seed as u64);

        let min_x = cell_x * MOUNTAIN_CELL_SIZE + CELL_INSET;
        let min_y = cell_y * MOUNTAIN_CELL_SIZE + CELL_INSET;
        let max_x = (cell_x + 1) * MOUNTAIN_CELL_SIZE - CELL_INSET;
        let max_y = (cell_y + 1) * MOUNTAIN_CELL_SIZE - CELL_INSET;

        let roots = rng.gen_range(1..=2);
        let mut out = Vec::with_capacity(roots * 13);

        for _ in 0..roots {
            let root = MountainData {
                center: (rng.gen_range(min_x..max_x), rng.gen_range(min_y..max_y)),
                height_amplitude: rng.gen_range(ROOT_AMPLITUDE),
                radius: rng.gen_range(ROOT_RADIUS),
            };
            push_unique(&mut out, root);
            Self::chain(&mut rng, root, (min_x, min_y, max_x, max_y), &mut out);
        }

        out
    }

    /// Walks 2-12 descendant peaks outward from a root.
    fn chain(
        rng: &mut WorldRng,
        root: MountainData,
        bounds: (i32, i32, i32, i32),
        out: &mut Vec<MountainData>,
    ) {
        let (min_x, min_y, max_x, max_y) = bounds;
        let steps = rng.gen_range(2..=12);
        let mut heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let mut parent = root;

        for _ in 0..steps {
            heading += rng.gen_range(-0.6..0.6);
            let step = parent.radius * rng.gen_range(0.45..0.85);
            let cx = f64::from(parent.center.0) + heading.cos() * step;
            let cy = f64::from(parent.center.1) + heading.sin() * step;

            let child = MountainData {
                center: (
                    (cx.round() as i32).clamp(min_x, max_x),
                    (cy.round() as i32).clamp(min_y, max_y),
                ),
                height_amplitude: parent.height_amplitude * rng.gen_range(CHILD_HEIGHT_FRACTION),
                radius: (parent.radius * rng.gen_range(0.75..1.0))
                    .clamp(MIN_MOUNTAIN_RADIUS, MAX_MOUNTAIN_RADIUS),
            };
            push_unique(out, child);
            parent = child;
        }
    }

    /// Clusters whose centre lies within `reach` of a world point.
    ///
    /// Checks the point's own cell plus whichever neighbours lie within
    /// `reach` of it, including diagonals. `reach` is clamped to one cell.
    #[must_use]
    pub fn mountains_within(&self, x: f64, y: f64, reach: f64) -> Vec<MountainData> {
        let reach = reach.min(f64::from(MOUNTAIN_CELL_SIZE));
        let size = f64::from(MOUNTAIN_CELL_SIZE);
        let (cell_x, cell_y) = Self::cell_of(x, y);

        let local_x = x - f64::from(cell_x) * size;
        let local_y = y - f64::from(cell_y) * size;
        let span_x = neighbour_span(local_x, reach, size);
        let span_y = neighbour_span(local_y, reach, size);

        let mut found = Vec::new();
        for dy in span_y.0..=span_y.1 {
            for dx in span_x.0..=span_x.1 {
                found.extend(
                    self.cell_mountains(cell_x + dx, cell_y + dy)
                        .into_iter()
                        .filter(|m| m.distance_to(x, y) <= reach),
                );
            }
        }
        found
    }

    /// Clusters that can influence a world point.
    #[must_use]
    pub fn mountains_near(&self, x: f64, y: f64) -> Vec<MountainData> {
        self.mountains_within(x, y, MAX_MOUNTAIN_RADIUS)
    }

    /// Clusters that can influence any point of a chunk column.
    ///
    /// A superset of [`MountainGrid::mountains_near`] for every point in
    /// the column, so one list serves the whole column.
    #[must_use]
    pub fn mountains_for_column(&self, column: ColumnCoord) -> Vec<MountainData> {
        let (cx, cy) = column.center();
        let half_diagonal = f64::from(CHUNK_SIZE_I32) * std::f64::consts::FRAC_1_SQRT_2;
        self.mountains_within(cx, cy, MAX_MOUNTAIN_RADIUS + half_diagonal + 1.0)
    }
}

/// Cell offsets `(lo, hi)` to scan along one axis.
#[inline]
fn neighbour_span(local: f64, reach: f64, size: f64) -> (i32, i32) {
    let lo = if local < reach { -1 } else { 0 };
    let hi = if size - local <= reach { 1 } else { 0 };
    (lo, hi)
}

/// Ridge networks are keyed by centre, so a cell never emits two clusters
/// sharing one.
fn push_unique(out: &mut Vec<MountainData>, mountain: MountainData) {
    if out.iter().all(|m| m.center != mountain.center) {
        out.push(mountain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_is_deterministic() {
        let grid = MountainGrid::new(1234);
        assert_eq!(grid.cell_mountains(3, -7), grid.cell_mountains(3, -7));
        assert_ne!(grid.cell_mountains(3, -7), grid.cell_mountains(-7, 3));
    }

    #[test]
    fn test_cell_contents_are_bounded() {
        let grid = MountainGrid::new(99);
        for cy in -3..3 {
            for cx in -3..3 {
                let mountains = grid.cell_mountains(cx, cy);
                assert!(
                    (1..=26).contains(&mountains.len()),
                    "cell ({cx},{cy}) has {} clusters",
                    mountains.len()
                );
                for m in &mountains {
                    assert_eq!(
                        MountainGrid::cell_of(f64::from(m.center.0), f64::from(m.center.1)),
                        (cx, cy),
                        "cluster left its cell"
                    );
                    assert!(m.radius <= MAX_MOUNTAIN_RADIUS);
                    assert!(m.height_amplitude > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_descendants_never_grow() {
        let grid = MountainGrid::new(5);
        let mountains = grid.cell_mountains(0, 0);
        let max = mountains.iter().map(|m| m.height_amplitude).fold(0.0, f64::max);
        assert!(max < ROOT_AMPLITUDE.end);
        assert!(mountains.iter().all(|m| m.height_amplitude > 0.0));
    }

    #[test]
    fn test_no_cluster_missed_across_cell_seams() {
        let grid = MountainGrid::new(4242);
        let size = f64::from(MOUNTAIN_CELL_SIZE);

        // Points just inside cell corners and edges
        let probes = [
            (1.0, 1.0),
            (size - 1.0, size - 1.0),
            (size * 0.5, 2.0),
            (2.0, size * 0.5),
            (-3.0, size + 3.0),
        ];
        for (x, y) in probes {
            let found = grid.mountains_near(x, y);

            let mut expected = Vec::new();
            let (cx, cy) = MountainGrid::cell_of(x, y);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    expected.extend(
                        grid.cell_mountains(cx + dx, cy + dy)
                            .into_iter()
                            .filter(|m| m.distance_to(x, y) <= MAX_MOUNTAIN_RADIUS),
                    );
                }
            }
            assert_eq!(found.len(), expected.len(), "probe ({x}, {y})");
            for m in &expected {
                assert!(found.contains(m), "missed {m:?} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_column_list_covers_every_point() {
        let grid = MountainGrid::new(7);
        for (cx, cy) in [(0, 0), (63, 63), (64, 0), (-1, -1), (10, 20)] {
            let column = ColumnCoord::new(cx, cy);
            let list = grid.mountains_for_column(column);
            for (lx, ly) in [(0, 0), (31, 0), (0, 31), (31, 31), (16, 7)] {
                let x = f64::from(column.world_x() + lx);
                let y = f64::from(column.world_y() + ly);
                for m in grid.mountains_near(x, y) {
                    assert!(list.contains(&m), "column {column:?} misses {m:?}");
                }
            }
        }
    }
}
