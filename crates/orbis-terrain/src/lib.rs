//! Volumetric planet terrain: descriptor, fractal surface noise, and signed-distance grid sampling.

mod density;
mod descriptor;
mod error;
mod sampler;
mod surface_noise;

pub use density::{DensityGrid, DensityStats};
pub use descriptor::{GridAnchor, NoiseMapping, PlanetDescriptor};
pub use error::{DescriptorError, TerrainError};
pub use sampler::{DensitySampler, default_worker_count};
pub use surface_noise::{LACUNARITY, PERSISTENCE, SurfaceNoise};
