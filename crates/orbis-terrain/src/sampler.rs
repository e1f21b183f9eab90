//! Density field sampling: analytic sphere plus fractal surface noise.
//!
//! Every grid sample is independent, so the buffer is split into contiguous
//! z-slab ranges and filled by scoped worker threads. The result does not
//! depend on the worker count.

use std::time::Instant;

use glam::Vec3;

use crate::density::DensityGrid;
use crate::descriptor::PlanetDescriptor;
use crate::error::{DescriptorError, TerrainError};
use crate::surface_noise::SurfaceNoise;

/// Evaluates the planet's signed-distance field.
#[derive(Clone, Debug)]
pub struct DensitySampler {
    noise: SurfaceNoise,
    radius: f32,
    height_scale: f32,
    resolution: usize,
    voxel_size: f32,
    center: Vec3,
}

impl DensitySampler {
    /// Build a sampler for a validated descriptor.
    pub fn new(descriptor: &PlanetDescriptor) -> Result<Self, DescriptorError> {
        descriptor.validate()?;
        Ok(Self {
            noise: SurfaceNoise::from_descriptor(descriptor),
            radius: descriptor.radius,
            height_scale: descriptor.terrain_height_scale,
            resolution: descriptor.resolution,
            voxel_size: descriptor.voxel_size(),
            center: descriptor.field_center(),
        })
    }

    /// Grid-local center of the field.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Signed distance at a grid-local point: `radius + noise * height_scale - distance`.
    ///
    /// At the center itself the noise term vanishes and the result is `radius`.
    pub fn density_at(&self, point: Vec3) -> f32 {
        let offset = point - self.center;
        let distance = offset.length();
        let noise = self.noise.sample(offset);
        let effective_radius = self.radius + noise * self.height_scale;
        effective_radius - distance
    }

    /// Sample the full `resolution³` grid using up to `workers` threads.
    ///
    /// `workers` of 0 or 1 samples on the calling thread.
    pub fn sample_grid(&self, workers: usize) -> Result<DensityGrid, TerrainError> {
        let samples = self
            .resolution
            .checked_mul(self.resolution)
            .and_then(|n| n.checked_mul(self.resolution))
            .ok_or(TerrainError::GridTooLarge(self.resolution))?;

        let mut values = Vec::new();
        values
            .try_reserve_exact(samples)
            .map_err(|source| TerrainError::Allocation { samples, source })?;
        values.resize(samples, 0.0);

        let start = Instant::now();
        let workers = workers.clamp(1, self.resolution);
        if workers == 1 {
            self.fill_slabs(0, &mut values);
        } else {
            self.fill_parallel(&mut values, workers)?;
        }

        tracing::debug!(
            resolution = self.resolution,
            workers,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Sampled density grid"
        );

        DensityGrid::from_values(self.resolution, self.voxel_size, self.center, values)
    }

    fn fill_parallel(&self, values: &mut [f32], workers: usize) -> Result<(), TerrainError> {
        let slab = self.resolution * self.resolution;
        let slabs_per_worker = self.resolution.div_ceil(workers);

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for (i, chunk) in values.chunks_mut(slab * slabs_per_worker).enumerate() {
                let first_slab = i * slabs_per_worker;
                let handle = std::thread::Builder::new()
                    .name(format!("density-worker-{i}"))
                    .spawn_scoped(scope, move || self.fill_slabs(first_slab, chunk))
                    .map_err(TerrainError::WorkerSpawn)?;
                handles.push(handle);
            }
            for handle in handles {
                handle.join().map_err(|_| TerrainError::WorkerPanicked)?;
            }
            Ok(())
        })
    }

    /// Fill `out` with the samples starting at z-slab `first_slab`.
    fn fill_slabs(&self, first_slab: usize, out: &mut [f32]) {
        let res = self.resolution;
        let base = first_slab * res * res;
        for (offset, value) in out.iter_mut().enumerate() {
            let i = base + offset;
            let x = i % res;
            let y = (i / res) % res;
            let z = i / (res * res);
            let point = Vec3::new(x as f32, y as f32, z as f32) * self.voxel_size;
            *value = self.density_at(point);
        }
    }
}

/// Number of workers to use when the caller does not choose one.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{GridAnchor, NoiseMapping};

    fn smooth_sphere() -> PlanetDescriptor {
        PlanetDescriptor {
            radius: 10.0,
            resolution: 4,
            noise_octaves: 0,
            terrain_height_scale: 0.0,
            world_size: 40.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_density_at_center_is_radius() {
        let descriptor = PlanetDescriptor {
            noise_octaves: 6,
            terrain_height_scale: 25.0,
            ..Default::default()
        };
        let sampler = DensitySampler::new(&descriptor).unwrap();
        assert_eq!(sampler.density_at(sampler.center()), descriptor.radius);
    }

    #[test]
    fn test_smooth_sphere_is_exact_distance() {
        let sampler = DensitySampler::new(&smooth_sphere()).unwrap();
        let center = sampler.center();
        assert_eq!(center, Vec3::splat(20.0));
        assert_eq!(sampler.density_at(center + Vec3::X * 10.0), 0.0);
        assert_eq!(sampler.density_at(center + Vec3::Y * 4.0), 6.0);
        assert_eq!(sampler.density_at(center - Vec3::Z * 15.0), -5.0);
    }

    #[test]
    fn test_centered_grid_is_one_voxel_short_above_center() {
        let descriptor = smooth_sphere();
        let sampler = DensitySampler::new(&descriptor).unwrap();
        let grid = sampler.sample_grid(1).unwrap();
        let last = descriptor.resolution - 1;
        let half = descriptor.world_size * 0.5;
        let voxel = descriptor.voxel_size();

        assert_eq!(grid.center() - grid.position(0, 0, 0), Vec3::splat(half));
        assert_eq!(
            grid.position(last, last, last) - grid.center(),
            Vec3::splat(half - voxel)
        );
    }

    #[test]
    fn test_grid_matches_point_sampling() {
        let descriptor = PlanetDescriptor {
            resolution: 6,
            world_size: 30.0,
            radius: 9.0,
            ..Default::default()
        };
        let sampler = DensitySampler::new(&descriptor).unwrap();
        let grid = sampler.sample_grid(1).unwrap();
        assert_eq!(grid.values().len(), 216);
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    assert_eq!(
                        grid.get(x, y, z),
                        sampler.density_at(grid.position(x, y, z)),
                        "Mismatch at ({x}, {y}, {z})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_worker_count_does_not_change_grid() {
        let descriptor = PlanetDescriptor {
            resolution: 17,
            world_size: 34.0,
            radius: 12.0,
            noise_octaves: 5,
            terrain_height_scale: 2.0,
            seed: 9,
            ..Default::default()
        };
        let sampler = DensitySampler::new(&descriptor).unwrap();
        let serial = sampler.sample_grid(1).unwrap();
        for workers in [2, 3, 8, 64] {
            let parallel = sampler.sample_grid(workers).unwrap();
            assert_eq!(serial, parallel, "Grid differs with {workers} workers");
        }
    }

    #[test]
    fn test_repeated_sampling_is_deterministic() {
        let descriptor = PlanetDescriptor {
            resolution: 12,
            noise_mapping: NoiseMapping::Planar,
            ..Default::default()
        };
        let a = DensitySampler::new(&descriptor).unwrap().sample_grid(4).unwrap();
        let b = DensitySampler::new(&descriptor).unwrap().sample_grid(4).unwrap();
        let bits_a: Vec<u32> = a.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_corner_anchor_uses_world_center() {
        let descriptor = PlanetDescriptor {
            world_center: Vec3::new(20.0, 20.0, 20.0),
            grid_anchor: GridAnchor::Corner,
            ..smooth_sphere()
        };
        let sampler = DensitySampler::new(&descriptor).unwrap();
        let grid = sampler.sample_grid(1).unwrap();
        assert_eq!(grid.center(), Vec3::splat(20.0));
        assert_eq!(grid.get(2, 2, 2), 10.0);
    }

    #[test]
    fn test_sphere_outside_volume_still_produces_grid() {
        let descriptor = PlanetDescriptor {
            radius: 1000.0,
            ..smooth_sphere()
        };
        let grid = DensitySampler::new(&descriptor)
            .unwrap()
            .sample_grid(2)
            .unwrap();
        let stats = grid.stats();
        assert_eq!(stats.inside, 64);
        assert!(!stats.crosses_surface());
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let descriptor = PlanetDescriptor {
            resolution: 1,
            ..Default::default()
        };
        assert_eq!(
            DensitySampler::new(&descriptor).unwrap_err(),
            DescriptorError::ResolutionTooSmall(1)
        );
    }
}
