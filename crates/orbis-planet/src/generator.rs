//! End-to-end planet generation: sample the density grid, extract the surface,
//! and place the mesh in world space.

use std::time::Instant;

use orbis_mesh::{Mesh, MeshStats, MeshingOptions, extract_mesh};
use orbis_terrain::{DensitySampler, PlanetDescriptor, default_worker_count};

use crate::error::PlanetError;
use crate::info::PlanetInfo;

/// A finished planet: world-space mesh, metadata and meshing counters.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPlanet {
    /// Surface mesh in world space.
    pub mesh: Mesh,
    /// Planet metadata.
    pub info: PlanetInfo,
    /// Counters gathered during extraction.
    pub stats: MeshStats,
}

/// Runs the sampling and meshing phases for one planet descriptor.
///
/// Each call to [`generate`](Self::generate) is independent; nothing is cached.
#[derive(Clone, Debug)]
pub struct PlanetGenerator {
    descriptor: PlanetDescriptor,
    meshing: MeshingOptions,
    workers: usize,
}

impl PlanetGenerator {
    /// Generator with default meshing options and one worker per logical CPU.
    pub fn new(descriptor: PlanetDescriptor) -> Self {
        Self {
            descriptor,
            meshing: MeshingOptions::default(),
            workers: default_worker_count(),
        }
    }

    /// Replace the meshing options.
    pub fn with_meshing(mut self, meshing: MeshingOptions) -> Self {
        self.meshing = meshing;
        self
    }

    /// Set the worker count for both phases. 0 or 1 runs on the calling thread.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// The descriptor this generator builds.
    pub fn descriptor(&self) -> &PlanetDescriptor {
        &self.descriptor
    }

    /// Generate the planet.
    ///
    /// A volume that never crosses the surface is not an error: it logs a
    /// warning and yields an empty mesh.
    pub fn generate(&self) -> Result<GeneratedPlanet, PlanetError> {
        let start = Instant::now();
        let sampler = DensitySampler::new(&self.descriptor)?;
        let grid = sampler.sample_grid(self.workers)?;

        let density = grid.stats();
        if !density.crosses_surface() {
            tracing::warn!(
                radius = self.descriptor.radius,
                world_size = self.descriptor.world_size,
                inside = density.inside,
                outside = density.outside,
                "Sampled volume never crosses the planet surface; mesh will be empty"
            );
        }

        let extracted = extract_mesh(&grid, &self.meshing, self.workers)?;
        let mut mesh = extracted.mesh;
        mesh.translate(self.descriptor.mesh_offset());
        let info = PlanetInfo::from_descriptor(&self.descriptor);

        tracing::info!(
            resolution = self.descriptor.resolution,
            seed = self.descriptor.seed,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            flipped = extracted.stats.flipped,
            degenerate = extracted.stats.degenerate,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generated planet"
        );

        Ok(GeneratedPlanet {
            mesh,
            info,
            stats: extracted.stats,
        })
    }
}

/// Generate a planet with default meshing options and one worker per logical CPU.
pub fn generate_planet(descriptor: &PlanetDescriptor) -> Result<GeneratedPlanet, PlanetError> {
    PlanetGenerator::new(descriptor.clone()).generate()
}
