//! # Ridge Networks
//!
//! A mountain cluster is a forest of branching polylines ("ridges") grown
//! from its centre. Every polyline sample is a [`Node`] whose height decays
//! from its parent's height toward a radial target, so ridges fall away
//! from the centre toward a floor.
//!
//! ## Height Queries
//!
//! Nodes live in a coarse bucket grid. A query ring-searches outward for the
//! nearest node, then again for a second node close to the first. Close
//! pairs are interpolated along the segment between them; otherwise the
//! nearest node's height is used. Either way a distance falloff is
//! subtracted and the result is clamped to `[1, RIDGE_AMPLITUDE]`, then
//! faded to zero at the network's rim.
//!
//! ```text
//!   ring 0   ring 1     ring 2
//!            . . .    . . . . .
//!     #      . # .    . . . . .
//!            . . .    . . # . .   visit rings until a hit, then
//!                     . . . . .   `passes` more rings
//!                     . . . . .
//! ```
//!
//! Networks are expensive to grow, so they are built once per cluster
//! centre and shared through a [`RidgeCache`].

use rand::Rng;

use crate::cache::StripedCache;
use crate::mountain::MountainData;
use crate::random::{mix, seeded_rng, WorldRng};

/// Maximum node height; query results lie in `[0, RIDGE_AMPLITUDE]`.
pub const RIDGE_AMPLITUDE: f64 = 255.0;

/// Shared cache of built networks keyed by cluster centre.
pub type RidgeCache = StripedCache<(i32, i32), RidgeNetwork>;

/// Spatial-hash bucket edge in world units.
const BUCKET_SIZE: f64 = 24.0;
/// Distance between consecutive polyline samples.
const LINE_STEP: f64 = 6.0;
/// Maximum heading change per polyline step (radians).
const ROUGHNESS: f64 = 0.2;
/// Starting branches per cluster.
const START_BRANCHES: std::ops::RangeInclusive<u32> = 3..=6;
/// Minimum angle between two starting branches.
const MIN_ANGLE_GAP: f64 = 0.55;
/// Attempts to find a free starting angle before giving up on a branch.
const BOUNCE_LIMIT: u32 = 16;
/// Chance that a polyline sample spawns a child branch.
const BRANCH_CHANCE: f64 = 0.035;
/// Total branches per network.
const MAX_BRANCHES: u32 = 40;
/// Maximum nesting of child branches.
const MAX_DEPTH: u32 = 3;
/// Radial target height at the rim.
const FLOOR_HEIGHT: f64 = 8.0;
/// Height lost per world unit away from the ridge line.
const FALLOFF: f64 = 1.6;
/// A second node further than this from the first is not used.
const SECOND_REACH: f64 = 40.0;
/// Nodes whose distances differ by more than this are not interpolated.
const SCORE_GAP: f64 = 20.0;
/// Width of the fade to zero at the network rim.
const EDGE_FADE: f64 = 64.0;
/// Radial blur taps beyond the cell itself.
const BLUR_TAPS: u32 = 4;
/// Spacing of radial blur taps in world units.
const BLUR_SPACING: f64 = 6.0;

/// One sample of a ridge polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// World position.
    pub position: (f64, f64),
    /// Node this one grew from (`None` for the cluster centre).
    pub previous: Option<u32>,
    /// Next node along the same polyline.
    pub next: Option<u32>,
    /// Ridge height in `[1, RIDGE_AMPLITUDE]`.
    pub height: f64,
}

/// How hard a query searches for neighbouring nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchMode {
    /// Rings visited before giving up.
    pub max_rings: i32,
    /// Extra rings visited after the first ring with a hit.
    pub passes: i32,
}

impl SearchMode {
    /// Authoritative chunk population.
    pub const PRECISE: Self = Self { max_rings: 12, passes: 2 };
    /// LOD and exploratory checks.
    pub const APPROXIMATE: Self = Self { max_rings: 6, passes: 0 };

    /// Mode for a compositor `precise` flag.
    #[inline]
    #[must_use]
    pub const fn from_precise(precise: bool) -> Self {
        if precise { Self::PRECISE } else { Self::APPROXIMATE }
    }
}

/// Bucket cells of a square ring at Chebyshev distance `radius`.
///
/// Ring 0 is the centre cell; ring `r > 0` has `8r` cells.
#[derive(Clone, Debug)]
pub struct RingCells {
    center: (i32, i32),
    radius: i32,
    index: i32,
    count: i32,
}

impl RingCells {
    /// Creates the ring iterator.
    #[must_use]
    pub fn new(center: (i32, i32), radius: i32) -> Self {
        let radius = radius.max(0);
        let count = if radius == 0 { 1 } else { 8 * radius };
        Self { center, radius, index: 0, count }
    }
}

impl Iterator for RingCells {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let k = self.index;
        self.index += 1;

        let (cx, cy) = self.center;
        let r = self.radius;
        if r == 0 {
            return Some((cx, cy));
        }

        let row = 2 * r + 1;
        let cell = if k < row {
            (cx - r + k, cy - r)
        } else if k < 2 * row {
            (cx - r + (k - row), cy + r)
        } else {
            let rem = k - 2 * row;
            let side = 2 * r - 1;
            if rem < side {
                (cx - r, cy - r + 1 + rem)
            } else {
                (cx + r, cy - r + 1 + (rem - side))
            }
        };
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.index).max(0) as usize;
        (left, Some(left))
    }
}

/// Coarse 2D bucket grid over a network's working area.
#[derive(Clone, Debug)]
struct SpatialHash {
    origin: (f64, f64),
    dim: i32,
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    fn new(center: (f64, f64), radius: f64) -> Self {
        let dim = (2.0 * radius / BUCKET_SIZE).ceil() as i32 + 1;
        Self {
            origin: (center.0 - radius, center.1 - radius),
            dim,
            buckets: vec![Vec::new(); (dim * dim) as usize],
        }
    }

    #[inline]
    fn bucket_of(&self, p: (f64, f64)) -> (i32, i32) {
        (
            ((p.0 - self.origin.0) / BUCKET_SIZE).floor() as i32,
            ((p.1 - self.origin.1) / BUCKET_SIZE).floor() as i32,
        )
    }

    #[inline]
    fn bucket(&self, cell: (i32, i32)) -> Option<&[u32]> {
        if cell.0 < 0 || cell.1 < 0 || cell.0 >= self.dim || cell.1 >= self.dim {
            return None;
        }
        Some(&self.buckets[(cell.0 + cell.1 * self.dim) as usize])
    }

    fn insert(&mut self, id: u32, p: (f64, f64)) {
        let (bx, by) = self.bucket_of(p);
        let bx = bx.clamp(0, self.dim - 1);
        let by = by.clamp(0, self.dim - 1);
        self.buckets[(bx + by * self.dim) as usize].push(id);
    }
}

/// A ring-search hit.
#[derive(Clone, Copy, Debug)]
struct Hit {
    index: u32,
    distance: f64,
}

/// The ridge graph of one mountain cluster. Immutable once built.
#[derive(Clone, Debug)]
pub struct RidgeNetwork {
    center: (f64, f64),
    radius: f64,
    nodes: Vec<Node>,
    hash: SpatialHash,
    branches: u32,
}

impl RidgeNetwork {
    /// Grows the network for a cluster.
    #[must_use]
    pub fn generate(mountain: &MountainData, world_seed: i64) -> Self {
        let center = (f64::from(mountain.center.0), f64::from(mountain.center.1));
        let radius = mountain.radius.max(BUCKET_SIZE);
        let mut rng = seeded_rng(mix(
            i64::from(mountain.center.0),
            i64::from(mountain.center.1),
            world_seed,
        ));

        let mut grower = Grower {
            rng: &mut rng,
            nodes: Vec::with_capacity(1024),
            center,
            radius,
            branches: 0,
        };
        grower.nodes.push(Node {
            position: center,
            previous: None,
            next: None,
            height: RIDGE_AMPLITUDE,
        });

        let starts = grower.rng.gen_range(START_BRANCHES);
        let mut used = Vec::with_capacity(starts as usize);
        for _ in 0..starts {
            let Some(angle) = pick_start_angle(grower.rng, &used) else {
                break;
            };
            used.push(angle);
            let length = radius * grower.rng.gen_range(0.7..0.95);
            grower.grow(0, angle, length, 0);
        }

        let branches = grower.branches;
        let nodes = grower.nodes;

        let mut hash = SpatialHash::new(center, radius);
        for (id, node) in nodes.iter().enumerate() {
            hash.insert(id as u32, node.position);
        }

        tracing::debug!(
            "ridge network at {:?}: {} nodes, {} branches",
            mountain.center,
            nodes.len(),
            branches
        );

        Self { center, radius, nodes, hash, branches }
    }

    /// Cluster centre.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    /// Generation radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// All nodes; index 0 is the cluster centre.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of polylines grown (starting branches plus children).
    #[must_use]
    pub fn branch_count(&self) -> u32 {
        self.branches
    }

    /// Ridge height at a world point, in `[0, RIDGE_AMPLITUDE]`.
    ///
    /// Returns 0 outside the generation radius or when no node lies in
    /// any searched ring.
    #[must_use]
    pub fn height_at(&self, x: f64, y: f64, mode: SearchMode) -> f64 {
        let from_center = distance((x, y), self.center);
        if from_center > self.radius {
            return 0.0;
        }

        let Some(first) = self.ring_search((x, y), mode.max_rings, mode.passes, |_, _| true) else {
            return 0.0;
        };
        let near = self.nodes[first.index as usize];

        let second_rings = ((first.distance + SECOND_REACH) / BUCKET_SIZE).ceil() as i32 + 1;
        let second = self.ring_search((x, y), second_rings, mode.passes, |id, node| {
            id != first.index && distance(node.position, near.position) <= SECOND_REACH
        });

        let raw = match second {
            Some(other) if other.distance - first.distance <= SCORE_GAP => {
                let far = self.nodes[other.index as usize];
                interpolate((x, y), &near, &far)
            }
            _ => near.height - FALLOFF * first.distance,
        };

        let fade = ((self.radius - from_center) / EDGE_FADE).clamp(0.0, 1.0);
        raw.clamp(1.0, RIDGE_AMPLITUDE) * fade
    }

    /// Visits bucket rings outward until a ring yields an accepted node,
    /// then `passes` more rings, and returns the closest accepted node.
    fn ring_search<F>(&self, q: (f64, f64), max_rings: i32, passes: i32, accept: F) -> Option<Hit>
    where
        F: Fn(u32, &Node) -> bool,
    {
        let origin = self.hash.bucket_of(q);
        let mut best: Option<Hit> = None;
        let mut rings_after_hit = 0;

        for ring in 0..=max_rings {
            for cell in RingCells::new(origin, ring) {
                let Some(bucket) = self.hash.bucket(cell) else {
                    continue;
                };
                for &id in bucket {
                    let node = &self.nodes[id as usize];
                    if !accept(id, node) {
                        continue;
                    }
                    let d = distance(q, node.position);
                    if best.map_or(true, |b| d < b.distance) {
                        best = Some(Hit { index: id, distance: d });
                    }
                }
            }
            if best.is_some() {
                if rings_after_hit >= passes {
                    break;
                }
                rings_after_hit += 1;
            }
        }
        best
    }

    /// Rasterises the working area at `step` spacing and applies the
    /// radial blur.
    #[must_use]
    pub fn rasterize(&self, step: f64) -> RidgeRaster {
        let step = step.max(1.0);
        let dim = (2.0 * self.radius / step).ceil() as usize + 1;
        let origin = (self.center.0 - self.radius, self.center.1 - self.radius);

        let mut raw = vec![0.0f64; dim * dim];
        for j in 0..dim {
            for i in 0..dim {
                let x = origin.0 + i as f64 * step;
                let y = origin.1 + j as f64 * step;
                raw[i + j * dim] = self.height_at(x, y, SearchMode::PRECISE);
            }
        }

        let sample = |x: f64, y: f64| -> Option<f64> {
            let i = ((x - origin.0) / step).round();
            let j = ((y - origin.1) / step).round();
            if i < 0.0 || j < 0.0 || i >= dim as f64 || j >= dim as f64 {
                return None;
            }
            Some(raw[i as usize + j as usize * dim])
        };

        let mut blurred = vec![0.0f64; dim * dim];
        for j in 0..dim {
            for i in 0..dim {
                let x = origin.0 + i as f64 * step;
                let y = origin.1 + j as f64 * step;
                let dx = x - self.center.0;
                let dy = y - self.center.1;
                let len = (dx * dx + dy * dy).sqrt();

                let here = raw[i + j * dim];
                if len < 1.0 || here == 0.0 {
                    blurred[i + j * dim] = here;
                    continue;
                }

                let (ux, uy) = (dx / len, dy / len);
                let mut sum = here;
                let mut taps = 1.0;
                for k in 1..=BLUR_TAPS {
                    let reach = f64::from(k) * BLUR_SPACING;
                    if len + reach > self.radius {
                        break;
                    }
                    if let Some(value) = sample(x + ux * reach, y + uy * reach) {
                        sum += value;
                        taps += 1.0;
                    }
                }
                blurred[i + j * dim] = sum / taps;
            }
        }

        RidgeRaster { origin, step, dim, heights: blurred }
    }
}

/// Dense, radially blurred height grid of one network.
#[derive(Clone, Debug)]
pub struct RidgeRaster {
    origin: (f64, f64),
    step: f64,
    dim: usize,
    heights: Vec<f64>,
}

impl RidgeRaster {
    /// Cells per side.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Raw cell values, x fastest.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Bilinear lookup; 0 outside the grid.
    #[must_use]
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        let fx = (x - self.origin.0) / self.step;
        let fy = (y - self.origin.1) / self.step;
        let last = (self.dim - 1) as f64;
        if !(0.0..=last).contains(&fx) || !(0.0..=last).contains(&fy) {
            return 0.0;
        }

        let i0 = (fx.floor() as usize).min(self.dim - 1);
        let j0 = (fy.floor() as usize).min(self.dim - 1);
        let i1 = (i0 + 1).min(self.dim - 1);
        let j1 = (j0 + 1).min(self.dim - 1);
        let tx = fx - i0 as f64;
        let ty = fy - j0 as f64;

        let at = |i: usize, j: usize| self.heights[i + j * self.dim];
        let top = at(i0, j0) + (at(i1, j0) - at(i0, j0)) * tx;
        let bottom = at(i0, j1) + (at(i1, j1) - at(i0, j1)) * tx;
        top + (bottom - top) * ty
    }
}

/// Grows polylines into the node list.
struct Grower<'a> {
    rng: &'a mut WorldRng,
    nodes: Vec<Node>,
    center: (f64, f64),
    radius: f64,
    branches: u32,
}

impl Grower<'_> {
    /// Height a node at `p` decays toward.
    fn radial_target(&self, p: (f64, f64)) -> f64 {
        let t = (1.0 - distance(p, self.center) / self.radius).max(0.0);
        FLOOR_HEIGHT + (RIDGE_AMPLITUDE - FLOOR_HEIGHT) * t
    }

    /// Grows one polyline from node `from`, spawning children on the way.
    fn grow(&mut self, from: u32, angle: f64, length: f64, depth: u32) {
        if self.branches >= MAX_BRANCHES {
            return;
        }
        self.branches += 1;

        let start = self.nodes[from as usize];
        let line = make_line(self.rng, start.position, angle, length, ROUGHNESS);
        let samples = line.len().max(1) as f64;

        let mut previous = from;
        let mut spawns = Vec::new();
        for (i, &(position, heading)) in line.iter().enumerate() {
            if distance(position, self.center) > self.radius - LINE_STEP {
                break;
            }
            let t = (i + 1) as f64 / samples;
            let target = self.radial_target(position);
            let height = (start.height + (target - start.height) * t).clamp(1.0, RIDGE_AMPLITUDE);

            let id = self.nodes.len() as u32;
            self.nodes.push(Node {
                position,
                previous: Some(previous),
                next: None,
                height,
            });
            let prev = &mut self.nodes[previous as usize];
            if prev.next.is_none() {
                prev.next = Some(id);
            }
            previous = id;

            if depth < MAX_DEPTH && self.rng.gen_bool(BRANCH_CHANCE) {
                let remaining = length * (1.0 - t);
                spawns.push((id, heading, remaining));
            }
        }

        for (id, heading, remaining) in spawns {
            let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let turn = side * self.rng.gen_range(0.5..1.2);
            let child_length = remaining * self.rng.gen_range(0.4..0.8);
            if child_length >= LINE_STEP * 2.0 {
                self.grow(id, heading + turn, child_length, depth + 1);
            }
        }
    }
}

/// Picks a starting angle at least `MIN_ANGLE_GAP` from every used one.
fn pick_start_angle(rng: &mut WorldRng, used: &[f64]) -> Option<f64> {
    for _ in 0..BOUNCE_LIMIT {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        if used.iter().all(|&u| angular_gap(angle, u) >= MIN_ANGLE_GAP) {
            return Some(angle);
        }
    }
    None
}

/// Randomised polyline: `(position, heading)` per step.
fn make_line(
    rng: &mut WorldRng,
    start: (f64, f64),
    angle: f64,
    length: f64,
    roughness: f64,
) -> Vec<((f64, f64), f64)> {
    let steps = (length / LINE_STEP).ceil().max(0.0) as usize;
    let mut heading = angle;
    let mut p = start;
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        heading += rng.gen_range(-roughness..=roughness);
        p = (p.0 + heading.cos() * LINE_STEP, p.1 + heading.sin() * LINE_STEP);
        out.push((p, heading));
    }
    out
}

/// Projects `q` onto the segment between two nodes and interpolates.
fn interpolate(q: (f64, f64), a: &Node, b: &Node) -> f64 {
    let (ax, ay) = a.position;
    let abx = b.position.0 - ax;
    let aby = b.position.1 - ay;
    let len2 = (abx * abx + aby * aby).max(1.0);
    let t = (((q.0 - ax) * abx + (q.1 - ay) * aby) / len2).clamp(0.0, 1.0);

    let foot = (ax + abx * t, ay + aby * t);
    let height = a.height + (b.height - a.height) * t;
    height - FALLOFF * distance(q, foot)
}

#[inline]
fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

#[inline]
fn angular_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(std::f64::consts::TAU);
    d.min(std::f64::consts::TAU - d)
}
