//! Cell classification and edge intersection for one unit cube of a density grid.
//!
//! Corners 0–3 form the bottom loop in the x/z plane at `y`, corners 4–7 the
//! same loop at `y + 1`. Edges 0–3 run around the bottom loop, 4–7 around the
//! top loop, and 8–11 are the verticals.

use glam::Vec3;
use orbis_terrain::DensityGrid;

use crate::tables::EDGE_TABLE;

/// Number of corners of a cube.
pub const CORNER_COUNT: usize = 8;

/// Number of edges of a cube.
pub const EDGE_COUNT: usize = 12;

/// Grid offset `(dx, dy, dz)` of each corner from the cube's minimum corner.
pub const CORNER_OFFSETS: [[usize; 3]; CORNER_COUNT] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 0, 1],
    [0, 0, 1],
    [0, 1, 0],
    [1, 1, 0],
    [1, 1, 1],
    [0, 1, 1],
];

/// The two corners joined by each edge.
pub const EDGE_CORNERS: [[usize; 2]; EDGE_COUNT] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Mask of a cube with every corner outside.
pub const MASK_OUTSIDE: u8 = 0;

/// Mask of a cube with every corner inside.
pub const MASK_INSIDE: u8 = 0xFF;

/// The 8 density samples around one grid cell and their grid-local positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
    /// Density at each corner.
    pub values: [f32; CORNER_COUNT],
    /// Grid-local position of each corner.
    pub corners: [Vec3; CORNER_COUNT],
    /// Bit `i` set iff corner `i` is inside (`value > 0`).
    pub mask: u8,
}

impl Cube {
    /// Build a cube from explicit corner samples.
    pub fn new(values: [f32; CORNER_COUNT], corners: [Vec3; CORNER_COUNT]) -> Self {
        let mask = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.0)
            .fold(0_u8, |mask, (i, _)| mask | (1 << i));
        Self {
            values,
            corners,
            mask,
        }
    }

    /// Read the cube whose minimum corner is grid sample `(x, y, z)`.
    ///
    /// Each coordinate must be below `resolution - 1`.
    pub fn load(grid: &DensityGrid, x: usize, y: usize, z: usize) -> Self {
        let mut values = [0.0; CORNER_COUNT];
        let mut corners = [Vec3::ZERO; CORNER_COUNT];
        for (i, [dx, dy, dz]) in CORNER_OFFSETS.iter().enumerate() {
            values[i] = grid.get(x + dx, y + dy, z + dz);
            corners[i] = grid.position(x + dx, y + dy, z + dz);
        }
        Self::new(values, corners)
    }

    /// `true` when every corner is on the same side of the surface.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.mask == MASK_OUTSIDE || self.mask == MASK_INSIDE
    }

    /// Mean of the 8 corner positions.
    pub fn centroid(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() / CORNER_COUNT as f32
    }

    /// Direction of increasing density across the cube, from averaged
    /// forward differences along each axis.
    ///
    /// Only the direction is meaningful; the magnitude assumes unit spacing.
    pub fn gradient(&self) -> Vec3 {
        let v = &self.values;
        let dx = (v[1] - v[0]) + (v[2] - v[3]) + (v[5] - v[4]) + (v[6] - v[7]);
        let dy = (v[4] - v[0]) + (v[5] - v[1]) + (v[6] - v[2]) + (v[7] - v[3]);
        let dz = (v[3] - v[0]) + (v[2] - v[1]) + (v[7] - v[4]) + (v[6] - v[5]);
        Vec3::new(dx, dy, dz) * 0.25
    }

    /// Zero crossings on every edge whose corners disagree in sign.
    ///
    /// Uniform cubes return no crossings without touching any edge.
    pub fn crossings(&self) -> EdgeCrossings {
        let mut crossings = EdgeCrossings::default();
        if self.is_uniform() {
            return crossings;
        }
        let crossed = EDGE_TABLE[self.mask as usize];
        for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
            if crossed & (1 << edge) == 0 {
                continue;
            }
            crossings.slots[edge] = interpolate_crossing(
                self.corners[a],
                self.values[a],
                self.corners[b],
                self.values[b],
            );
        }
        crossings
    }
}

/// Point where the field changes sign between `p1` and `p2`.
///
/// Uses `t = |v1| / (|v1| + |v2|)`. Returns `None` when both values are zero.
pub fn interpolate_crossing(p1: Vec3, v1: f32, p2: Vec3, v2: f32) -> Option<Vec3> {
    let denominator = v1.abs() + v2.abs();
    if denominator == 0.0 {
        return None;
    }
    let t = v1.abs() / denominator;
    Some(p1.lerp(p2, t))
}

/// The crossing points of one cube, indexed by edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeCrossings {
    slots: [Option<Vec3>; EDGE_COUNT],
}

impl EdgeCrossings {
    /// Crossing point on `edge`, if that edge is crossed.
    #[inline]
    pub fn at(&self, edge: usize) -> Option<Vec3> {
        self.slots[edge]
    }

    /// Number of crossed edges.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Crossing points in discovery order (ascending edge index).
    ///
    /// Returns a fixed buffer and the number of leading entries in use.
    pub fn ordered(&self) -> ([Vec3; EDGE_COUNT], usize) {
        let mut points = [Vec3::ZERO; EDGE_COUNT];
        let mut len = 0;
        for point in self.slots.iter().flatten() {
            points[len] = *point;
            len += 1;
        }
        (points, len)
    }
}
