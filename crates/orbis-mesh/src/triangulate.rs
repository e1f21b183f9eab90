//! Per-cube triangulation of edge crossings.
//!
//! The default strategy fans triangles out from the centroid of a cube's
//! crossing points, visiting the points in edge-index order. It is cheaper
//! than a lookup table but does not guarantee a crack-free surface across
//! shared cube faces. The canonical marching-cubes table is available as an
//! alternative mode.

use std::ops::AddAssign;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::cube::{Cube, EdgeCrossings};
use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::tables::triangle_edges;

/// How a cube's crossings are turned into triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangulationMode {
    /// Fan from the crossing centroid for every surface cube.
    #[default]
    Fan,
    /// Like `Fan`, except cubes with exactly 4 crossings emit one oriented
    /// quad through the crossings instead of the fan.
    Quad,
    /// Fan for every surface cube, plus an uncorrected quad for cubes with
    /// exactly 4 crossings. The quad overlaps the fan.
    FanAndQuad,
    /// Canonical 256-case lookup table.
    MarchingCubes,
}

/// Reference direction used to decide which side of a triangle faces out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// From the cube's center towards the triangle's centroid.
    CubeCentroid,
    /// Down the density gradient across the cube.
    FieldGradient,
    /// Away from the grid's field center.
    #[default]
    Radial,
}

/// Triangulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshingOptions {
    /// Triangulation strategy.
    pub mode: TriangulationMode,
    /// Outward reference for winding correction.
    pub orientation: Orientation,
    /// Fan edges between consecutive crossings no longer than this are
    /// dropped, in grid units.
    pub min_edge_length: f32,
}

impl Default for MeshingOptions {
    fn default() -> Self {
        Self {
            mode: TriangulationMode::Fan,
            orientation: Orientation::Radial,
            min_edge_length: 1e-4,
        }
    }
}

/// Counters gathered while meshing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Cubes visited.
    pub cubes: usize,
    /// Cubes with corners on both sides of the surface.
    pub surface_cubes: usize,
    /// Triangles emitted.
    pub triangles: usize,
    /// Triangles whose winding was reversed to face outward.
    pub flipped: usize,
    /// Fan triangles dropped because consecutive crossings nearly coincide.
    pub short_edges: usize,
    /// Triangles dropped because their normal could not be computed.
    pub degenerate: usize,
}

impl AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.cubes += rhs.cubes;
        self.surface_cubes += rhs.surface_cubes;
        self.triangles += rhs.triangles;
        self.flipped += rhs.flipped;
        self.short_edges += rhs.short_edges;
        self.degenerate += rhs.degenerate;
    }
}

/// Turns one cube at a time into triangles.
#[derive(Clone, Debug)]
pub struct Triangulator {
    mode: TriangulationMode,
    orientation: Orientation,
    min_edge_length: f32,
    radial_center: Vec3,
}

impl Triangulator {
    /// `radial_center` is the reference point for [`Orientation::Radial`].
    pub fn new(options: &MeshingOptions, radial_center: Vec3) -> Self {
        Self {
            mode: options.mode,
            orientation: options.orientation,
            min_edge_length: options.min_edge_length,
            radial_center,
        }
    }

    /// Append the triangles of `cube` to `out`.
    pub fn triangulate(
        &self,
        cube: &Cube,
        out: &mut Mesh,
        stats: &mut MeshStats,
    ) -> Result<(), MeshError> {
        if cube.is_uniform() {
            return Ok(());
        }
        let crossings = cube.crossings();

        if self.mode == TriangulationMode::MarchingCubes {
            return self.emit_table(cube, &crossings, out, stats);
        }

        let (buffer, len) = crossings.ordered();
        let points = &buffer[..len];
        if points.len() < 3 {
            return Ok(());
        }

        match (self.mode, points.len()) {
            (TriangulationMode::Quad, 4) => self.emit_quad(cube, points, true, out, stats),
            (TriangulationMode::FanAndQuad, 4) => {
                self.emit_fan(cube, points, out, stats)?;
                self.emit_quad(cube, points, false, out, stats)
            }
            _ => self.emit_fan(cube, points, out, stats),
        }
    }

    fn emit_fan(
        &self,
        cube: &Cube,
        points: &[Vec3],
        out: &mut Mesh,
        stats: &mut MeshStats,
    ) -> Result<(), MeshError> {
        let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;

        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if a.distance(b) <= self.min_edge_length {
                stats.short_edges += 1;
                continue;
            }
            let Some(normal) = (a - centroid).cross(b - centroid).try_normalize() else {
                stats.degenerate += 1;
                continue;
            };
            self.emit_oriented(cube, [centroid, a, b], normal, out, stats)?;
        }
        Ok(())
    }

    fn emit_quad(
        &self,
        cube: &Cube,
        points: &[Vec3],
        oriented: bool,
        out: &mut Mesh,
        stats: &mut MeshStats,
    ) -> Result<(), MeshError> {
        for [i, j, k] in [[0, 1, 2], [0, 2, 3]] {
            let tri = [points[i], points[j], points[k]];
            let Some(normal) = (tri[1] - tri[0]).cross(tri[2] - tri[0]).try_normalize() else {
                stats.degenerate += 1;
                continue;
            };
            if oriented {
                self.emit_oriented(cube, tri, normal, out, stats)?;
            } else {
                out.push_triangle(tri, normal)?;
                stats.triangles += 1;
            }
        }
        Ok(())
    }

    fn emit_table(
        &self,
        cube: &Cube,
        crossings: &EdgeCrossings,
        out: &mut Mesh,
        stats: &mut MeshStats,
    ) -> Result<(), MeshError> {
        for [e0, e1, e2] in triangle_edges(cube.mask) {
            let (Some(a), Some(b), Some(c)) = (crossings.at(e0), crossings.at(e1), crossings.at(e2))
            else {
                stats.degenerate += 1;
                continue;
            };
            let Some(normal) = (b - a).cross(c - a).try_normalize() else {
                stats.degenerate += 1;
                continue;
            };
            self.emit_oriented(cube, [a, b, c], normal, out, stats)?;
        }
        Ok(())
    }

    /// Push a triangle, reversing its winding and normal if it faces inward.
    fn emit_oriented(
        &self,
        cube: &Cube,
        tri: [Vec3; 3],
        normal: Vec3,
        out: &mut Mesh,
        stats: &mut MeshStats,
    ) -> Result<(), MeshError> {
        let outward = self.outward(cube, tri);
        if normal.dot(outward) < 0.0 {
            out.push_triangle([tri[0], tri[2], tri[1]], -normal)?;
            stats.flipped += 1;
        } else {
            out.push_triangle(tri, normal)?;
        }
        stats.triangles += 1;
        Ok(())
    }

    fn outward(&self, cube: &Cube, tri: [Vec3; 3]) -> Vec3 {
        let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
        match self.orientation {
            Orientation::CubeCentroid => centroid - cube.centroid(),
            Orientation::FieldGradient => -cube.gradient(),
            Orientation::Radial => centroid - self.radial_center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::CORNER_OFFSETS;

    fn unit_corners() -> [Vec3; 8] {
        CORNER_OFFSETS.map(|[x, y, z]| Vec3::new(x as f32, y as f32, z as f32))
    }

    fn triangulator(mode: TriangulationMode, orientation: Orientation, center: Vec3) -> Triangulator {
        let options = MeshingOptions {
            mode,
            orientation,
            ..Default::default()
        };
        Triangulator::new(&options, center)
    }

    fn run(triangulator: &Triangulator, cube: &Cube) -> (Mesh, MeshStats) {
        let mut mesh = Mesh::new();
        let mut stats = MeshStats::default();
        triangulator.triangulate(cube, &mut mesh, &mut stats).unwrap();
        (mesh, stats)
    }

    /// Bottom half inside, top half outside: a horizontal plane at y = 0.5.
    fn slab_cube() -> Cube {
        let corners = unit_corners();
        Cube::new(corners.map(|p| 0.5 - p.y), corners)
    }

    /// Only corner 0 inside.
    fn corner_cube() -> Cube {
        let mut values = [-1.0; 8];
        values[0] = 1.0;
        Cube::new(values, unit_corners())
    }

    fn triangle_normals_face(mesh: &Mesh, direction: Vec3) -> bool {
        mesh.triangles()
            .zip(mesh.normals.chunks_exact(3))
            .all(|(tri, normals)| {
                let winding = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                normals[0].dot(direction) > 0.0 && winding.dot(normals[0]) > 0.0
            })
    }

    #[test]
    fn test_uniform_cube_emits_nothing() {
        let t = triangulator(TriangulationMode::FanAndQuad, Orientation::Radial, Vec3::ZERO);
        for value in [1.0, -1.0] {
            let cube = Cube::new([value; 8], unit_corners());
            let (mesh, stats) = run(&t, &cube);
            assert!(mesh.is_empty());
            assert_eq!(stats, MeshStats::default());
        }
    }

    #[test]
    fn test_fan_single_corner() {
        let t = triangulator(TriangulationMode::Fan, Orientation::CubeCentroid, Vec3::ZERO);
        let (mesh, stats) = run(&t, &corner_cube());
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(stats.triangles, 3);
        assert!(mesh.is_well_formed());
        // Every fan triangle starts at the crossing centroid.
        let centroid = Vec3::splat(0.5 / 3.0);
        for tri in mesh.triangles() {
            assert!(tri[0].distance(centroid) < 1e-6);
        }
    }

    #[test]
    fn test_fan_faces_away_from_inside() {
        // Inside is the bottom half, so the surface should face +y. The cube
        // centroid lies in this plane and cannot decide a side here.
        for orientation in [Orientation::FieldGradient, Orientation::Radial] {
            let t = triangulator(
                TriangulationMode::Fan,
                orientation,
                Vec3::new(0.5, -10.0, 0.5),
            );
            let (mesh, _) = run(&t, &slab_cube());
            assert!(!mesh.is_empty(), "{orientation:?} emitted nothing");
            assert!(mesh.is_well_formed());
            assert!(
                triangle_normals_face(&mesh, Vec3::Y),
                "{orientation:?} produced an inward triangle"
            );
        }
    }

    #[test]
    fn test_cube_centroid_orientation_faces_away_from_cube_center() {
        for mode in [TriangulationMode::Fan, TriangulationMode::MarchingCubes] {
            let t = triangulator(mode, Orientation::CubeCentroid, Vec3::ZERO);
            let (mesh, _) = run(&t, &corner_cube());
            assert!(!mesh.is_empty(), "{mode:?} emitted nothing");
            for (tri, normals) in mesh.triangles().zip(mesh.normals.chunks_exact(3)) {
                let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
                let away = centroid - Vec3::splat(0.5);
                let winding = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                assert!(normals[0].dot(away) >= 0.0, "{mode:?} normal {}", normals[0]);
                assert!(winding.dot(normals[0]) > 0.0, "{mode:?} winding disagrees");
            }
        }
    }

    #[test]
    fn test_fan_and_quad_leaves_quad_unoriented() {
        // Reference below the slab: the fan flips to +y, the quad keeps its
        // raw -y normal.
        let t = triangulator(
            TriangulationMode::FanAndQuad,
            Orientation::Radial,
            Vec3::new(0.5, -1.0, 0.5),
        );
        let (mesh, stats) = run(&t, &slab_cube());
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(stats.flipped, 4);
        let normals: Vec<Vec3> = mesh.normals.chunks_exact(3).map(|n| n[0]).collect();
        for normal in &normals[..4] {
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-6), "fan normal {normal}");
        }
        for normal in &normals[4..] {
            assert!(normal.abs_diff_eq(Vec3::NEG_Y, 1e-6), "quad normal {normal}");
        }
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn test_radial_orientation_flips_towards_reference() {
        // Same cube, reference point above: outward is now -y.
        let t = triangulator(TriangulationMode::Fan, Orientation::Radial, Vec3::new(0.5, 10.0, 0.5));
        let (mesh, _) = run(&t, &slab_cube());
        assert!(triangle_normals_face(&mesh, -Vec3::Y));
    }

    #[test]
    fn test_fan_and_quad_duplicates_geometry() {
        let fan = triangulator(TriangulationMode::Fan, Orientation::Radial, Vec3::new(0.5, -1.0, 0.5));
        let both = triangulator(
            TriangulationMode::FanAndQuad,
            Orientation::Radial,
            Vec3::new(0.5, -1.0, 0.5),
        );
        let (fan_mesh, _) = run(&fan, &slab_cube());
        let (both_mesh, _) = run(&both, &slab_cube());
        assert_eq!(fan_mesh.triangle_count(), 4);
        assert_eq!(both_mesh.triangle_count(), 6);
        assert!(both_mesh.is_well_formed());
    }

    #[test]
    fn test_quad_mode_replaces_fan() {
        let t = triangulator(TriangulationMode::Quad, Orientation::Radial, Vec3::new(0.5, -1.0, 0.5));
        let (mesh, _) = run(&t, &slab_cube());
        assert_eq!(mesh.triangle_count(), 2);
        assert!(triangle_normals_face(&mesh, Vec3::Y));
    }

    #[test]
    fn test_quad_mode_falls_back_to_fan() {
        let t = triangulator(TriangulationMode::Quad, Orientation::Radial, Vec3::ZERO);
        let (mesh, _) = run(&t, &corner_cube());
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn test_marching_cubes_slab() {
        let t = triangulator(
            TriangulationMode::MarchingCubes,
            Orientation::Radial,
            Vec3::new(0.5, -1.0, 0.5),
        );
        let (mesh, stats) = run(&t, &slab_cube());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(stats.degenerate, 0);
        for vertex in &mesh.vertices {
            assert!((vertex.y - 0.5).abs() < 1e-6);
        }
        assert!(triangle_normals_face(&mesh, Vec3::Y));
    }

    #[test]
    fn test_marching_cubes_single_corner() {
        let t = triangulator(
            TriangulationMode::MarchingCubes,
            Orientation::FieldGradient,
            Vec3::ZERO,
        );
        let (mesh, _) = run(&t, &corner_cube());
        assert_eq!(mesh.triangle_count(), 1);
        assert!(triangle_normals_face(&mesh, Vec3::ONE));
    }

    #[test]
    fn test_short_edges_skipped() {
        let options = MeshingOptions {
            min_edge_length: 10.0,
            ..Default::default()
        };
        let t = Triangulator::new(&options, Vec3::ZERO);
        let (mesh, stats) = run(&t, &corner_cube());
        assert!(mesh.is_empty());
        assert_eq!(stats.short_edges, 3);
    }

    #[test]
    fn test_crossings_on_corners_still_triangulate() {
        // Corner 0 inside, corners 1 and 3 exactly on the surface. Zero counts
        // as outside, so two crossings collapse onto those corners.
        let mut values = [-1.0; 8];
        values[0] = 1.0;
        values[1] = 0.0;
        values[3] = 0.0;
        let cube = Cube::new(values, unit_corners());
        let t = triangulator(TriangulationMode::Fan, Orientation::Radial, Vec3::ZERO);
        let (mesh, stats) = run(&t, &cube);
        // Three crossings: two sit on corners 1 and 3, one on edge 8.
        assert_eq!(cube.crossings().count(), 3);
        assert!(mesh.is_well_formed());
        assert_eq!(stats.triangles, mesh.triangle_count());
    }

    #[test]
    fn test_stats_add_assign() {
        let mut total = MeshStats {
            cubes: 1,
            triangles: 2,
            ..Default::default()
        };
        total += MeshStats {
            cubes: 3,
            flipped: 1,
            ..Default::default()
        };
        assert_eq!(total.cubes, 4);
        assert_eq!(total.triangles, 2);
        assert_eq!(total.flipped, 1);
    }
}
