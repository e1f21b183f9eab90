//! Planet descriptor: the immutable author-time parameters of a volumetric planet.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// How a sample direction is turned into coherent-noise coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseMapping {
    /// Project the unit direction onto its `x` and `z` components and sample
    /// 2D noise. Distorts near the `y` axis.
    Planar,
    /// Sample 3D noise directly at the unit direction. Seamless and pole-free.
    #[default]
    Spherical,
}

/// Where the sampled volume sits relative to the planet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridAnchor {
    /// The volume is centered on the planet: the field center in grid-local
    /// space is the half extent, and the mesh is shifted by
    /// `world_center - half_extent` after assembly.
    ///
    /// Samples sit at `i * voxel_size` for `i < resolution`, so the last one is
    /// at `world_size - voxel_size`. The sampled volume therefore reaches
    /// `half_extent` below the center but one voxel less above it.
    #[default]
    Centered,
    /// The grid origin is world zero: the field center in grid-local space is
    /// `world_center` itself and the mesh needs no shift.
    Corner,
}

/// Definition of a volumetric planet.
///
/// Constant for a generation run. Grid and mesh buffers derived from it are
/// owned by the generation call, never by the descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetDescriptor {
    /// Base sphere radius before noise, in world units.
    pub radius: f32,
    /// Grid edge length in samples. Cost scales with `resolution³`.
    pub resolution: usize,
    /// Base spatial frequency of the surface noise.
    pub noise_scale: f32,
    /// Number of fractal noise layers summed.
    pub noise_octaves: u32,
    /// Multiplier applied to the noise sum before it is added to the radius.
    pub terrain_height_scale: f32,
    /// World-space point the planet is centered on.
    pub world_center: Vec3,
    /// Physical edge length of the sampled cube.
    pub world_size: f32,
    /// Seed for the noise permutation table.
    pub seed: u32,
    /// Direction-to-noise mapping.
    pub noise_mapping: NoiseMapping,
    /// Placement of the sampled volume.
    pub grid_anchor: GridAnchor,
    /// Extra clearance above the highest possible terrain for the spawn point.
    pub spawn_margin: f32,
}

impl Default for PlanetDescriptor {
    fn default() -> Self {
        Self {
            radius: 48.0,
            resolution: 64,
            noise_scale: 2.0,
            noise_octaves: 4,
            terrain_height_scale: 6.0,
            world_center: Vec3::ZERO,
            world_size: 128.0,
            seed: 0,
            noise_mapping: NoiseMapping::Spherical,
            grid_anchor: GridAnchor::Centered,
            spawn_margin: 2.0,
        }
    }
}

impl PlanetDescriptor {
    /// Physical size of one voxel: `world_size / resolution`.
    pub fn voxel_size(&self) -> f32 {
        self.world_size / self.resolution as f32
    }

    /// Total number of grid samples, or `None` if `resolution³` overflows.
    pub fn sample_count(&self) -> Option<usize> {
        self.resolution
            .checked_mul(self.resolution)
            .and_then(|n| n.checked_mul(self.resolution))
    }

    /// Center of the density field in grid-local coordinates.
    ///
    /// For [`GridAnchor::Centered`] this is `world_size / 2`, not the midpoint
    /// of the outermost samples. See the anchor for the resulting extent.
    pub fn field_center(&self) -> Vec3 {
        match self.grid_anchor {
            GridAnchor::Centered => Vec3::splat(self.world_size * 0.5),
            GridAnchor::Corner => self.world_center,
        }
    }

    /// Translation from grid-local to world space.
    pub fn mesh_offset(&self) -> Vec3 {
        self.world_center - self.field_center()
    }

    /// Check the descriptor invariants.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.resolution < 2 {
            return Err(DescriptorError::ResolutionTooSmall(self.resolution));
        }
        if !self.world_size.is_finite() || self.world_size <= 0.0 {
            return Err(DescriptorError::InvalidWorldSize(self.world_size));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(DescriptorError::InvalidRadius(self.radius));
        }
        let finite = [
            ("noise_scale", self.noise_scale),
            ("terrain_height_scale", self.terrain_height_scale),
            ("spawn_margin", self.spawn_margin),
            ("world_center.x", self.world_center.x),
            ("world_center.y", self.world_center.y),
            ("world_center.z", self.world_center.z),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DescriptorError::NonFinite(*field));
        }
        Ok(())
    }
}
