//! Multi-octave fractal surface noise evaluated per direction from the planet center.
//!
//! Octaves of Perlin noise are composited with fixed persistence (0.5) and
//! lacunarity (2.0). The result is the raw signed sum of the octaves: each
//! octave lies in roughly `[-1, 1]` and no remap is applied, so the value
//! scales `terrain_height_scale` directly.

use glam::{DVec2, DVec3, Vec3};
use noise::{NoiseFn, Perlin};

use crate::descriptor::{NoiseMapping, PlanetDescriptor};

/// Amplitude multiplier between successive octaves.
pub const PERSISTENCE: f64 = 0.5;

/// Frequency multiplier between successive octaves.
pub const LACUNARITY: f64 = 2.0;

/// Constant shift applied to every noise coordinate. Perlin noise is zero on
/// integer lattice points, including the origin.
const NOISE_OFFSET: DVec3 = DVec3::new(31.416, 47.853, 12.577);

/// Fractal surface perturbation sampled by direction.
#[derive(Clone, Debug)]
pub struct SurfaceNoise {
    perlin: Perlin,
    mapping: NoiseMapping,
    scale: f64,
    octaves: u32,
}

impl SurfaceNoise {
    /// Create a noise synthesizer from explicit parameters.
    pub fn new(seed: u32, mapping: NoiseMapping, scale: f32, octaves: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            mapping,
            scale: scale as f64,
            octaves,
        }
    }

    /// Create the synthesizer described by a planet descriptor.
    pub fn from_descriptor(descriptor: &PlanetDescriptor) -> Self {
        Self::new(
            descriptor.seed,
            descriptor.noise_mapping,
            descriptor.noise_scale,
            descriptor.noise_octaves,
        )
    }

    /// Sample the perturbation for an offset from the planet center.
    ///
    /// The offset is normalized first. A zero-length (or non-finite) offset
    /// returns `0.0`.
    pub fn sample(&self, offset: Vec3) -> f32 {
        let Some(direction) = offset.try_normalize() else {
            return 0.0;
        };
        let direction = direction.as_dvec3();

        let mut total = 0.0;
        let mut frequency = self.scale;
        let mut amplitude = 1.0;

        for _ in 0..self.octaves {
            let value = match self.mapping {
                NoiseMapping::Planar => {
                    let coord = DVec2::new(direction.x, direction.z) * frequency
                        + DVec2::new(NOISE_OFFSET.x, NOISE_OFFSET.z);
                    self.perlin.get(coord.to_array())
                }
                NoiseMapping::Spherical => {
                    let coord = direction * frequency + NOISE_OFFSET;
                    self.perlin.get(coord.to_array())
                }
            };
            total += value * amplitude;

            amplitude *= PERSISTENCE;
            frequency *= LACUNARITY;
        }

        total as f32
    }

    /// Geometric sum of all octave amplitudes: the bound on `|sample()|`
    /// assuming each octave stays within `[-1, 1]`.
    pub fn max_amplitude(&self) -> f32 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            sum += amplitude;
            amplitude *= PERSISTENCE;
        }
        sum as f32
    }

    /// Number of octaves summed per sample.
    pub fn octaves(&self) -> u32 {
        self.octaves
    }
}
