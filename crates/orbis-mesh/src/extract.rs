//! Whole-grid surface extraction.
//!
//! Cubes are visited in z, then y, then x order. Parallel extraction splits the
//! z layers into contiguous ranges, meshes each range on its own scoped thread,
//! and concatenates the partial meshes in range order, so the output is
//! identical to a serial pass.

use std::time::Instant;

use orbis_terrain::DensityGrid;

use crate::cube::Cube;
use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::triangulate::{MeshStats, MeshingOptions, Triangulator};

/// A grid-local mesh and the counters gathered while building it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedMesh {
    /// Triangles in grid-local coordinates.
    pub mesh: Mesh,
    /// Extraction counters.
    pub stats: MeshStats,
}

/// Partial result of one worker's layer range.
struct LayerBatch {
    index: usize,
    mesh: Mesh,
    stats: MeshStats,
}

/// Extract the zero isosurface of `grid` using up to `workers` threads.
///
/// The mesh is in grid-local coordinates. `workers` of 0 or 1 meshes on the
/// calling thread.
pub fn extract_mesh(
    grid: &DensityGrid,
    options: &MeshingOptions,
    workers: usize,
) -> Result<ExtractedMesh, MeshError> {
    let layers = grid.resolution().saturating_sub(1);
    if layers == 0 {
        return Ok(ExtractedMesh::default());
    }

    let start = Instant::now();
    let triangulator = Triangulator::new(options, grid.center());
    let workers = workers.clamp(1, layers);

    let extracted = if workers == 1 {
        let (mesh, stats) = mesh_layers(grid, &triangulator, 0, layers)?;
        ExtractedMesh { mesh, stats }
    } else {
        extract_parallel(grid, &triangulator, layers, workers)?
    };

    tracing::debug!(
        cubes = extracted.stats.cubes,
        surface_cubes = extracted.stats.surface_cubes,
        triangles = extracted.stats.triangles,
        workers,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Extracted surface mesh"
    );

    Ok(extracted)
}

fn extract_parallel(
    grid: &DensityGrid,
    triangulator: &Triangulator,
    layers: usize,
    workers: usize,
) -> Result<ExtractedMesh, MeshError> {
    let per_worker = layers.div_ceil(workers);
    let (tx, rx) = crossbeam_channel::unbounded::<Result<LayerBatch, MeshError>>();

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for (index, first) in (0..layers).step_by(per_worker).enumerate() {
            let last = (first + per_worker).min(layers);
            let tx = tx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn_scoped(scope, move || {
                    let batch = mesh_layers(grid, triangulator, first, last)
                        .map(|(mesh, stats)| LayerBatch { index, mesh, stats });
                    let _ = tx.send(batch);
                })
                .map_err(MeshError::WorkerSpawn)?;
            handles.push(handle);
        }
        for handle in handles {
            handle.join().map_err(|_| MeshError::WorkerPanicked)?;
        }
        Ok::<(), MeshError>(())
    })?;
    drop(tx);

    let mut batches = rx.try_iter().collect::<Result<Vec<_>, _>>()?;
    batches.sort_unstable_by_key(|batch| batch.index);

    let mut extracted = ExtractedMesh::default();
    for batch in batches {
        extracted.mesh.append(batch.mesh)?;
        extracted.stats += batch.stats;
    }
    Ok(extracted)
}

/// Mesh every cube whose minimum corner lies in z layers `first..last`.
fn mesh_layers(
    grid: &DensityGrid,
    triangulator: &Triangulator,
    first: usize,
    last: usize,
) -> Result<(Mesh, MeshStats), MeshError> {
    let cells = grid.resolution() - 1;
    let mut mesh = Mesh::new();
    let mut stats = MeshStats::default();

    for z in first..last {
        for y in 0..cells {
            for x in 0..cells {
                stats.cubes += 1;
                let cube = Cube::load(grid, x, y, z);
                if cube.is_uniform() {
                    continue;
                }
                stats.surface_cubes += 1;
                triangulator.triangulate(&cube, &mut mesh, &mut stats)?;
            }
        }
    }
    Ok((mesh, stats))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::triangulate::{Orientation, TriangulationMode};

    /// Exact sphere of `radius` around the middle of a `resolution³` grid.
    fn sphere_grid(resolution: usize, voxel_size: f32, radius: f32) -> DensityGrid {
        let center = Vec3::splat((resolution - 1) as f32 * voxel_size * 0.5);
        let mut values = Vec::with_capacity(resolution.pow(3));
        for z in 0..resolution {
            for y in 0..resolution {
                for x in 0..resolution {
                    let p = Vec3::new(x as f32, y as f32, z as f32) * voxel_size;
                    values.push(radius - p.distance(center));
                }
            }
        }
        DensityGrid::from_values(resolution, voxel_size, center, values).unwrap()
    }

    fn options(mode: TriangulationMode) -> MeshingOptions {
        MeshingOptions {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_grid_is_empty() {
        let grid = DensityGrid::from_values(3, 1.0, Vec3::ZERO, vec![-1.0; 27]).unwrap();
        let extracted = extract_mesh(&grid, &MeshingOptions::default(), 4).unwrap();
        assert!(extracted.mesh.is_empty());
        assert_eq!(extracted.stats.cubes, 8);
        assert_eq!(extracted.stats.surface_cubes, 0);
    }

    #[test]
    fn test_minimum_grid_single_cube() {
        let mut values = vec![-1.0; 8];
        values[0] = 1.0;
        let grid = DensityGrid::from_values(2, 1.0, Vec3::ZERO, values).unwrap();
        let extracted = extract_mesh(&grid, &MeshingOptions::default(), 8).unwrap();
        assert_eq!(extracted.stats.cubes, 1);
        assert_eq!(extracted.stats.surface_cubes, 1);
        assert_eq!(extracted.mesh.triangle_count(), 3);
    }

    #[test]
    fn test_sphere_mesh_is_well_formed() {
        let grid = sphere_grid(12, 1.0, 4.0);
        for mode in [
            TriangulationMode::Fan,
            TriangulationMode::Quad,
            TriangulationMode::FanAndQuad,
            TriangulationMode::MarchingCubes,
        ] {
            let extracted = extract_mesh(&grid, &options(mode), 1).unwrap();
            let mesh = &extracted.mesh;
            assert!(!mesh.is_empty(), "{mode:?} produced no triangles");
            assert!(mesh.is_well_formed(), "{mode:?} produced a malformed mesh");
            assert_eq!(extracted.stats.triangles, mesh.triangle_count());
            assert_eq!(mesh.vertex_count(), mesh.triangle_count() * 3);
        }
    }

    #[test]
    fn test_sphere_vertices_near_surface() {
        let grid = sphere_grid(16, 0.5, 3.0);
        let extracted = extract_mesh(&grid, &options(TriangulationMode::MarchingCubes), 1).unwrap();
        // Linear interpolation along a voxel edge stays within a voxel of the surface.
        for vertex in &extracted.mesh.vertices {
            let r = vertex.distance(grid.center());
            assert!((r - 3.0).abs() < 0.5, "Vertex at distance {r}");
        }
    }

    #[test]
    fn test_radial_orientation_faces_outward() {
        let grid = sphere_grid(14, 1.0, 5.0);
        let extracted = extract_mesh(&grid, &MeshingOptions::default(), 1).unwrap();
        let mesh = &extracted.mesh;
        for (tri, normals) in mesh.triangles().zip(mesh.normals.chunks_exact(3)) {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(normals[0].dot(centroid - grid.center()) >= -1e-4);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let grid = sphere_grid(13, 1.0, 4.5);
        for mode in [TriangulationMode::Fan, TriangulationMode::MarchingCubes] {
            let serial = extract_mesh(&grid, &options(mode), 1).unwrap();
            for workers in [2, 3, 5, 100] {
                let parallel = extract_mesh(&grid, &options(mode), workers).unwrap();
                assert_eq!(serial, parallel, "{mode:?} differs with {workers} workers");
            }
        }
    }

    #[test]
    fn test_orientation_modes_keep_triangle_count() {
        let grid = sphere_grid(10, 1.0, 3.5);
        let counts: Vec<usize> = [
            Orientation::CubeCentroid,
            Orientation::FieldGradient,
            Orientation::Radial,
        ]
        .into_iter()
        .map(|orientation| {
            let options = MeshingOptions {
                orientation,
                ..Default::default()
            };
            extract_mesh(&grid, &options, 2).unwrap().mesh.triangle_count()
        })
        .collect();
        assert!(counts.windows(2).all(|w| w[0] == w[1]));
    }
}
