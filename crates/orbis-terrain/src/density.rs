//! Dense signed-distance grid over a cubic volume.
//!
//! Values are stored x-fastest in one contiguous buffer: the sample at
//! `(x, y, z)` lives at `x + y * res + z * res²`. Positive values are inside
//! the surface, negative values outside.

use glam::Vec3;

use crate::error::TerrainError;

/// A `resolution³` grid of signed distances.
///
/// Created by a single generation call and read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityGrid {
    values: Vec<f32>,
    resolution: usize,
    voxel_size: f32,
    center: Vec3,
}

/// Classification counts over a density grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DensityStats {
    /// Samples with a positive value.
    pub inside: usize,
    /// Samples with a zero or negative value.
    pub outside: usize,
    /// Samples within two voxels of the surface (`|sdf| < 2 * voxel_size`).
    pub near_surface: usize,
}

impl DensityStats {
    /// Whether any sample lies within two voxels of the surface. When none
    /// does, the sphere misses the sampled volume.
    pub fn crosses_surface(&self) -> bool {
        self.near_surface > 0
    }
}

impl DensityGrid {
    /// Wrap an existing buffer of `resolution³` values.
    ///
    /// `center` is the grid-local point the field is built around; meshing
    /// uses it as the radial reference.
    pub fn from_values(
        resolution: usize,
        voxel_size: f32,
        center: Vec3,
        values: Vec<f32>,
    ) -> Result<Self, TerrainError> {
        let expected = resolution
            .checked_mul(resolution)
            .and_then(|n| n.checked_mul(resolution))
            .ok_or(TerrainError::GridTooLarge(resolution))?;
        if values.len() != expected {
            return Err(TerrainError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            resolution,
            voxel_size,
            center,
        })
    }

    /// Samples per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Physical spacing between neighboring samples.
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Grid-local center of the field.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Raw sample buffer in x-fastest order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Linear buffer index of `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.resolution && y < self.resolution && z < self.resolution);
        x + y * self.resolution + z * self.resolution * self.resolution
    }

    /// Value at `(x, y, z)`. Each coordinate must be below `resolution()`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.index(x, y, z)]
    }

    /// Grid-local position of sample `(x, y, z)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        Vec3::new(x as f32, y as f32, z as f32) * self.voxel_size
    }

    /// Count inside, outside and near-surface samples.
    pub fn stats(&self) -> DensityStats {
        let band = 2.0 * self.voxel_size;
        let mut stats = DensityStats::default();
        for &value in &self.values {
            if value > 0.0 {
                stats.inside += 1;
            } else {
                stats.outside += 1;
            }
            if value.abs() < band {
                stats.near_surface += 1;
            }
        }
        stats
    }
}
